pub mod schedule;
pub mod sweep;

use tracing::{debug, instrument};

use crate::UserId;
use crate::store::{MatchStore, StoreError};

pub use schedule::{ScheduleError, SweepSchedule, next_run_after};
pub use sweep::{SweepError, SweepReport, run_reliability_sweep};

/// Penalty per recorded no-show.
pub const NO_SHOW_PENALTY: f64 = 0.1;
/// Upper bound on the total no-show penalty.
pub const MAX_NO_SHOW_PENALTY: f64 = 0.5;

#[derive(Debug, thiserror::Error)]
pub enum ReliabilityError {
    #[error("user {0} not found")]
    UserNotFound(UserId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Completion rate minus a capped no-show penalty, in [0, 1].
/// A worker with no finished jobs is fully trusted.
pub fn compute_reliability_score(completed: u32, no_show: u32) -> f64 {
    let total = completed + no_show;
    if total == 0 {
        return 1.0;
    }

    let completion_rate = f64::from(completed) / f64::from(total);
    let penalty = (f64::from(no_show) * NO_SHOW_PENALTY).min(MAX_NO_SHOW_PENALTY);
    (completion_rate - penalty).clamp(0.0, 1.0)
}

/// Recompute a worker's score from their counters and persist it.
#[instrument(skip(store))]
pub async fn recompute_reliability<S: MatchStore>(
    store: &S,
    user_id: UserId,
) -> Result<f64, ReliabilityError> {
    let stats = store
        .fetch_worker_stats(user_id)
        .await?
        .ok_or(ReliabilityError::UserNotFound(user_id))?;

    let score = compute_reliability_score(stats.completed_jobs_count, stats.no_show_count);
    store.save_reliability_score(user_id, score).await?;

    debug!(
        user_id,
        completed = stats.completed_jobs_count,
        no_show = stats.no_show_count,
        previous = stats.reliability_score,
        score,
        "reliability score updated"
    );
    Ok(score)
}
