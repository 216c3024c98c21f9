use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::{
    history::PastPerformanceCache,
    scoring::{MatchScorer, MatchingConfig, WorkerContext},
};
use crate::{
    JobPosting, UserId, WorkerStats,
    api::RankedJob,
    store::{MatchStore, StoreError},
};

pub struct MatchingEngine {
    scorer: MatchScorer,
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new(MatchingConfig::default())
    }
}

impl MatchingEngine {
    pub fn new(config: MatchingConfig) -> Self {
        Self {
            scorer: MatchScorer::new(config),
        }
    }

    /// Score every job for the worker and order them best first.
    ///
    /// Never fails: a missing profile or a store error yields the jobs
    /// unscored, in the order they were given.
    pub async fn rank_jobs<S: MatchStore>(
        &self,
        store: &S,
        jobs: Vec<JobPosting>,
        worker_id: UserId,
        now: DateTime<Utc>,
    ) -> Vec<RankedJob> {
        if jobs.is_empty() {
            return Vec::new();
        }

        match self.try_rank(store, &jobs, worker_id, now).await {
            Ok(Some(ranked)) => ranked,
            Ok(None) => {
                debug!(worker_id, jobs = jobs.len(), "no profile; returning jobs unscored");
                unscored(jobs)
            }
            Err(err) => {
                warn!(
                    worker_id,
                    jobs = jobs.len(),
                    error = %err,
                    "match scoring failed; returning jobs unscored"
                );
                unscored(jobs)
            }
        }
    }

    async fn try_rank<S: MatchStore>(
        &self,
        store: &S,
        jobs: &[JobPosting],
        worker_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<Vec<RankedJob>>, StoreError> {
        let Some(profile) = store.fetch_profile(worker_id).await? else {
            return Ok(None);
        };
        let stats = store
            .fetch_worker_stats(worker_id)
            .await?
            .unwrap_or_else(|| WorkerStats::new(worker_id));
        let worker = WorkerContext { profile, stats };

        let mut history = PastPerformanceCache::new(store, worker_id);
        let mut ranked = Vec::with_capacity(jobs.len());
        for job in jobs {
            let past_performance = history.ratio(job.organizer_id).await?;
            let score = self
                .scorer
                .calculate_match_score(job, &worker, past_performance, now);
            ranked.push(RankedJob::scored(job.clone(), score));
        }

        // sort_by is stable, so equal scores keep the caller's order.
        ranked.sort_by(|a, b| b.match_score.cmp(&a.match_score));

        info!(
            worker_id,
            jobs = ranked.len(),
            top_score = ranked.first().and_then(|job| job.match_score),
            "ranked jobs for worker"
        );
        Ok(Some(ranked))
    }
}

fn unscored(jobs: Vec<JobPosting>) -> Vec<RankedJob> {
    jobs.into_iter().map(RankedJob::unscored).collect()
}

/// Rank candidate jobs for a worker with the default weights.
pub async fn rank_jobs<S: MatchStore>(
    store: &S,
    jobs: Vec<JobPosting>,
    worker_id: UserId,
) -> Vec<RankedJob> {
    rank_jobs_at(store, jobs, worker_id, Utc::now()).await
}

pub async fn rank_jobs_at<S: MatchStore>(
    store: &S,
    jobs: Vec<JobPosting>,
    worker_id: UserId,
    now: DateTime<Utc>,
) -> Vec<RankedJob> {
    MatchingEngine::default()
        .rank_jobs(store, jobs, worker_id, now)
        .await
}
