use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{AttendanceStore, JobCounter, MatchStore, StoreError};
use crate::{
    ApplicationId, ApplicationRecord, JobId, JobPosting, TerminalApplication, UserId,
    WorkerProfile, WorkerStats,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Worker,
    Organizer,
}

#[derive(Debug, Default)]
struct Tables {
    roles: BTreeMap<UserId, Role>,
    profiles: HashMap<UserId, WorkerProfile>,
    stats: HashMap<UserId, WorkerStats>,
    jobs: HashMap<JobId, JobPosting>,
    applications: BTreeMap<ApplicationId, ApplicationRecord>,
    failing_saves: HashSet<UserId>,
    history_unavailable: bool,
    listing_unavailable: bool,
}

/// Store backed by process memory. Used by tests and local tooling; the
/// locks are never held across an await.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    history_queries: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a worker with stats (the user record) and an optional profile.
    pub fn insert_worker(&self, stats: WorkerStats, profile: Option<WorkerProfile>) {
        let mut tables = self.tables();
        tables.roles.insert(stats.user_id, Role::Worker);
        if let Some(profile) = profile {
            tables.profiles.insert(profile.user_id, profile);
        }
        tables.stats.insert(stats.user_id, stats);
    }

    pub fn insert_organizer(&self, user_id: UserId) {
        self.tables().roles.insert(user_id, Role::Organizer);
    }

    pub fn insert_job(&self, job: JobPosting) {
        self.tables().jobs.insert(job.id, job);
    }

    pub fn insert_application(&self, application: ApplicationRecord) {
        self.tables()
            .applications
            .insert(application.id, application);
    }

    pub fn stats(&self, user_id: UserId) -> Option<WorkerStats> {
        self.tables().stats.get(&user_id).cloned()
    }

    pub fn application(&self, id: ApplicationId) -> Option<ApplicationRecord> {
        self.tables().applications.get(&id).cloned()
    }

    /// Make `save_reliability_score` fail for this user.
    pub fn fail_saves_for(&self, user_id: UserId) {
        self.tables().failing_saves.insert(user_id);
    }

    /// Make `fetch_terminal_applications` fail for every worker.
    pub fn set_history_unavailable(&self, unavailable: bool) {
        self.tables().history_unavailable = unavailable;
    }

    /// Make `list_worker_ids` fail.
    pub fn set_listing_unavailable(&self, unavailable: bool) {
        self.tables().listing_unavailable = unavailable;
    }

    /// How many times the application history has been queried.
    pub fn history_queries(&self) -> usize {
        self.history_queries.load(Ordering::SeqCst)
    }
}

impl MatchStore for InMemoryStore {
    async fn fetch_profile(&self, user_id: UserId) -> Result<Option<WorkerProfile>, StoreError> {
        Ok(self.tables().profiles.get(&user_id).cloned())
    }

    async fn fetch_worker_stats(&self, user_id: UserId) -> Result<Option<WorkerStats>, StoreError> {
        Ok(self.tables().stats.get(&user_id).cloned())
    }

    async fn fetch_terminal_applications(
        &self,
        pro_id: UserId,
    ) -> Result<Vec<TerminalApplication>, StoreError> {
        self.history_queries.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables();
        if tables.history_unavailable {
            return Err(StoreError::Unavailable("application history".into()));
        }

        Ok(tables
            .applications
            .values()
            .filter(|app| app.pro_id == pro_id && app.status.counts_as_history())
            .filter_map(|app| {
                tables.jobs.get(&app.job_id).map(|job| TerminalApplication {
                    job_id: job.id,
                    organizer_id: job.organizer_id,
                    status: app.status,
                })
            })
            .collect())
    }

    async fn save_reliability_score(&self, user_id: UserId, score: f64) -> Result<(), StoreError> {
        let mut tables = self.tables();
        if tables.failing_saves.contains(&user_id) {
            return Err(StoreError::Unavailable(format!(
                "write rejected for user {user_id}"
            )));
        }

        let stats = tables
            .stats
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::NotFound(format!("user {user_id}")))?;
        stats.reliability_score = Some(score);
        Ok(())
    }

    async fn list_worker_ids(&self) -> Result<Vec<UserId>, StoreError> {
        let tables = self.tables();
        if tables.listing_unavailable {
            return Err(StoreError::Unavailable("worker listing".into()));
        }

        Ok(tables
            .roles
            .iter()
            .filter(|(_, role)| **role == Role::Worker)
            .map(|(id, _)| *id)
            .collect())
    }
}

impl AttendanceStore for InMemoryStore {
    async fn fetch_application(
        &self,
        job_id: JobId,
        pro_id: UserId,
    ) -> Result<Option<ApplicationRecord>, StoreError> {
        Ok(self
            .tables()
            .applications
            .values()
            .find(|app| app.job_id == job_id && app.pro_id == pro_id)
            .cloned())
    }

    async fn fetch_application_by_id(
        &self,
        id: ApplicationId,
    ) -> Result<Option<ApplicationRecord>, StoreError> {
        Ok(self.tables().applications.get(&id).cloned())
    }

    async fn save_application(&self, application: &ApplicationRecord) -> Result<(), StoreError> {
        self.tables()
            .applications
            .insert(application.id, application.clone());
        Ok(())
    }

    async fn increment_counter(
        &self,
        user_id: UserId,
        counter: JobCounter,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables();
        let stats = tables
            .stats
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::NotFound(format!("user {user_id}")))?;
        match counter {
            JobCounter::Completed => stats.completed_jobs_count += 1,
            JobCounter::NoShow => stats.no_show_count += 1,
        }
        Ok(())
    }
}
