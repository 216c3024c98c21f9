use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::AvailabilityWindow;

/// Score used when a worker has not declared any availability.
pub const UNDECLARED_AVAILABILITY_SCORE: f64 = 0.5;

/// Binary availability check of a job against a worker's weekly windows.
///
/// Only hours are compared (minutes are ignored) and only the start day is
/// checked, so a job running past midnight is judged on its first day.
pub fn availability_score(
    windows: &[AvailabilityWindow],
    job_start: DateTime<Utc>,
    job_end: DateTime<Utc>,
) -> f64 {
    if windows.is_empty() {
        return UNDECLARED_AVAILABILITY_SCORE;
    }

    let day = job_start.weekday().num_days_from_sunday();
    let start_hour = job_start.hour();
    let end_hour = job_end.hour();

    let fits = windows.iter().any(|window| {
        if u32::from(window.day_of_week) != day {
            return false;
        }
        match (hour_of(&window.start_time), hour_of(&window.end_time)) {
            (Some(open), Some(close)) => open <= start_hour && close >= end_hour,
            _ => false,
        }
    });

    if fits { 1.0 } else { 0.0 }
}

/// Integer hour of an `HH:MM` string.
fn hour_of(time: &str) -> Option<u32> {
    time.split(':').next()?.trim().parse().ok()
}
