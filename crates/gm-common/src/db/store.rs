use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::db::{PgPool, applications, jobs, profiles, users};
use crate::store::{AttendanceStore, JobCounter, MatchStore, StoreError};
use crate::{
    ApplicationId, ApplicationRecord, JobId, JobPosting, TerminalApplication, UserId,
    WorkerProfile, WorkerStats,
};

/// Postgres-backed store. Each call checks a connection out of the pool
/// for the duration of one statement.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn fetch_open_jobs(
        &self,
        after: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<JobPosting>, StoreError> {
        let client = self.pool.get().await?;
        jobs::fetch_open_jobs(&client, after, limit).await
    }

    #[instrument(skip(self))]
    pub async fn fetch_job(&self, id: JobId) -> Result<Option<JobPosting>, StoreError> {
        let client = self.pool.get().await?;
        jobs::fetch_job(&client, id).await
    }
}

impl MatchStore for PgStore {
    #[instrument(skip(self))]
    async fn fetch_profile(&self, user_id: UserId) -> Result<Option<WorkerProfile>, StoreError> {
        let client = self.pool.get().await?;
        profiles::fetch_profile(&client, user_id).await
    }

    #[instrument(skip(self))]
    async fn fetch_worker_stats(&self, user_id: UserId) -> Result<Option<WorkerStats>, StoreError> {
        let client = self.pool.get().await?;
        users::fetch_worker_stats(&client, user_id).await
    }

    #[instrument(skip(self))]
    async fn fetch_terminal_applications(
        &self,
        pro_id: UserId,
    ) -> Result<Vec<TerminalApplication>, StoreError> {
        let client = self.pool.get().await?;
        applications::fetch_terminal_applications(&client, pro_id).await
    }

    #[instrument(skip(self))]
    async fn save_reliability_score(&self, user_id: UserId, score: f64) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        users::save_reliability_score(&client, user_id, score).await
    }

    #[instrument(skip(self))]
    async fn list_worker_ids(&self) -> Result<Vec<UserId>, StoreError> {
        let client = self.pool.get().await?;
        users::list_worker_ids(&client).await
    }
}

impl AttendanceStore for PgStore {
    #[instrument(skip(self))]
    async fn fetch_application(
        &self,
        job_id: JobId,
        pro_id: UserId,
    ) -> Result<Option<ApplicationRecord>, StoreError> {
        let client = self.pool.get().await?;
        applications::fetch_application(&client, job_id, pro_id).await
    }

    #[instrument(skip(self))]
    async fn fetch_application_by_id(
        &self,
        id: ApplicationId,
    ) -> Result<Option<ApplicationRecord>, StoreError> {
        let client = self.pool.get().await?;
        applications::fetch_application_by_id(&client, id).await
    }

    #[instrument(skip(self, application), fields(application_id = application.id))]
    async fn save_application(&self, application: &ApplicationRecord) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        applications::save_application(&client, application).await
    }

    #[instrument(skip(self))]
    async fn increment_counter(
        &self,
        user_id: UserId,
        counter: JobCounter,
    ) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        users::increment_counter(&client, user_id, counter).await
    }
}

#[cfg(test)]
mod tests {
    use deadpool_postgres::{Client, GenericClient};

    #[test]
    fn pooled_client_satisfies_query_helpers() {
        fn accepts<C: GenericClient>() {}
        accepts::<Client>();
    }
}
