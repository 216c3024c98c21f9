#![allow(async_fn_in_trait)]

pub mod memory;

use deadpool_postgres::PoolError;
use tokio_postgres::Error as PgError;

use crate::{
    ApplicationId, ApplicationRecord, JobId, TerminalApplication, UserId, WorkerProfile,
    WorkerStats,
};

pub use memory::InMemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
    #[error("failed to map row: {0}")]
    Mapping(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Counters on the user record that only ever go up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobCounter {
    Completed,
    NoShow,
}

impl JobCounter {
    pub fn column(&self) -> &'static str {
        match self {
            JobCounter::Completed => "completed_jobs_count",
            JobCounter::NoShow => "no_show_count",
        }
    }
}

/// Reads the scorer and reliability updater need, plus the single write the
/// reliability updater makes.
pub trait MatchStore {
    async fn fetch_profile(&self, user_id: UserId) -> Result<Option<WorkerProfile>, StoreError>;

    async fn fetch_worker_stats(&self, user_id: UserId) -> Result<Option<WorkerStats>, StoreError>;

    /// Completed and no-show applications of a worker, joined with the
    /// organizer of each application's job.
    async fn fetch_terminal_applications(
        &self,
        pro_id: UserId,
    ) -> Result<Vec<TerminalApplication>, StoreError>;

    async fn save_reliability_score(&self, user_id: UserId, score: f64) -> Result<(), StoreError>;

    /// Every user with the worker role, in a stable order.
    async fn list_worker_ids(&self) -> Result<Vec<UserId>, StoreError>;
}

/// Writes made by the check-in / check-out flow.
pub trait AttendanceStore: MatchStore {
    async fn fetch_application(
        &self,
        job_id: JobId,
        pro_id: UserId,
    ) -> Result<Option<ApplicationRecord>, StoreError>;

    async fn fetch_application_by_id(
        &self,
        id: ApplicationId,
    ) -> Result<Option<ApplicationRecord>, StoreError>;

    async fn save_application(&self, application: &ApplicationRecord) -> Result<(), StoreError>;

    /// Atomic `counter = counter + 1`, so concurrent check-outs never lose an update.
    async fn increment_counter(
        &self,
        user_id: UserId,
        counter: JobCounter,
    ) -> Result<(), StoreError>;
}
