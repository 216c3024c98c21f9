pub mod api;
pub mod attendance;
pub mod db;
pub mod logging;
pub mod matching;
pub mod reliability;
pub mod run_id;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type JobId = i64;
pub type ApplicationId = i64;

// Commonly used data models for matching functions.

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Weekly slot a worker declared as available. Times are 24h `HH:MM` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityWindow {
    /// 0 = Sunday
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
}

impl AvailabilityWindow {
    pub fn new(day_of_week: u8, start_time: &str, end_time: &str) -> Self {
        Self {
            day_of_week,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerProfile {
    pub user_id: UserId,
    pub skills: Vec<String>,
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub availability_windows: Vec<AvailabilityWindow>,
}

/// Fields that live on the user record rather than the profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerStats {
    pub user_id: UserId,
    pub rating_avg: Option<f64>,
    pub reliability_score: Option<f64>,
    pub last_active_date: Option<DateTime<Utc>>,
    pub completed_jobs_count: u32,
    pub no_show_count: u32,
}

impl WorkerStats {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub id: JobId,
    pub organizer_id: UserId,
    #[serde(default)]
    pub title: String,
    pub required_skills: Vec<String>,
    pub location: Option<GeoPoint>,
    pub date_start: DateTime<Utc>,
    pub date_end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobValidationError {
    #[error("job {0} ends before it starts")]
    EndNotAfterStart(JobId),
}

impl JobPosting {
    /// Window check. Job loaders skip postings that fail it.
    pub fn validate(&self) -> Result<(), JobValidationError> {
        if self.date_end <= self.date_start {
            return Err(JobValidationError::EndNotAfterStart(self.id));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Declined,
    Completed,
    NoShow,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Declined => "declined",
            ApplicationStatus::Completed => "completed",
            ApplicationStatus::NoShow => "no-show",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(ApplicationStatus::Pending),
            "accepted" => Some(ApplicationStatus::Accepted),
            "declined" => Some(ApplicationStatus::Declined),
            "completed" => Some(ApplicationStatus::Completed),
            "no-show" => Some(ApplicationStatus::NoShow),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Completed | ApplicationStatus::NoShow | ApplicationStatus::Declined
        )
    }

    /// Statuses that count toward past performance with an organizer.
    pub fn counts_as_history(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Completed | ApplicationStatus::NoShow
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceKind {
    CheckIn,
    CheckOut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    #[serde(rename = "type")]
    pub kind: AttendanceKind,
    pub timestamp: DateTime<Utc>,
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub pro_id: UserId,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub check_in_timestamps: Vec<AttendanceEvent>,
    pub hours_worked: Option<f64>,
}

impl ApplicationRecord {
    pub fn new(id: ApplicationId, job_id: JobId, pro_id: UserId, status: ApplicationStatus) -> Self {
        Self {
            id,
            job_id,
            pro_id,
            status,
            check_in_timestamps: Vec::new(),
            hours_worked: None,
        }
    }
}

/// An application in a history-relevant state, joined with its job's organizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalApplication {
    pub job_id: JobId,
    pub organizer_id: UserId,
    pub status: ApplicationStatus,
}
