use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use super::recompute_reliability;
use crate::store::{MatchStore, StoreError};
use crate::{UserId, run_id};

#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error("failed to list workers: {0}")]
    ListWorkers(#[source] StoreError),
}

/// Outcome of one pass over every worker.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Workers attempted.
    pub processed: usize,
    pub updated: usize,
    pub failed: usize,
    pub failed_user_ids: Vec<UserId>,
}

impl SweepReport {
    fn start() -> Self {
        let now = Utc::now();
        Self {
            run_id: run_id::next(),
            started_at: now,
            finished_at: now,
            processed: 0,
            updated: 0,
            failed: 0,
            failed_user_ids: Vec::new(),
        }
    }

    pub fn duration_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Recompute the reliability score of every worker, one at a time.
///
/// A failure for one worker is logged and counted and the sweep moves on.
/// Only a failure to list the workers aborts the run.
pub async fn run_reliability_sweep<S: MatchStore>(store: &S) -> Result<SweepReport, SweepError> {
    let mut report = SweepReport::start();
    info!(
        run_id = %report.run_id,
        process_id = run_id::process(),
        "reliability sweep started"
    );

    let worker_ids = store.list_worker_ids().await.map_err(|err| {
        error!(run_id = %report.run_id, error = %err, "reliability sweep aborted");
        SweepError::ListWorkers(err)
    })?;

    for user_id in worker_ids {
        report.processed += 1;
        match recompute_reliability(store, user_id).await {
            Ok(_) => report.updated += 1,
            Err(err) => {
                warn!(
                    run_id = %report.run_id,
                    user_id,
                    error = %err,
                    "reliability recompute failed; continuing"
                );
                report.failed += 1;
                report.failed_user_ids.push(user_id);
            }
        }
    }

    report.finished_at = Utc::now();
    info!(
        run_id = %report.run_id,
        processed = report.processed,
        updated = report.updated,
        failed = report.failed,
        duration_secs = report.duration_secs(),
        "reliability sweep finished"
    );
    Ok(report)
}
