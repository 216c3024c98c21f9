use std::collections::HashMap;

use tracing::debug;

use crate::store::{MatchStore, StoreError};
use crate::{ApplicationStatus, TerminalApplication, UserId};

/// Ratio used when a worker has never finished a job for an organizer.
pub const NO_HISTORY_SCORE: f64 = 0.5;

/// Completion ratio of a worker's history with one organizer.
pub fn completion_ratio(history: &[TerminalApplication], organizer_id: UserId) -> f64 {
    let (completed, total) = history
        .iter()
        .filter(|app| app.organizer_id == organizer_id && app.status.counts_as_history())
        .fold((0usize, 0usize), |(completed, total), app| {
            let done = usize::from(app.status == ApplicationStatus::Completed);
            (completed + done, total + 1)
        });

    if total == 0 {
        return NO_HISTORY_SCORE;
    }
    completed as f64 / total as f64
}

/// Past-performance lookups for one ranking request.
///
/// Each distinct organizer costs one history query; later jobs from the same
/// organizer reuse the ratio. Drop it when the request ends.
pub struct PastPerformanceCache<'a, S> {
    store: &'a S,
    worker_id: UserId,
    ratios: HashMap<UserId, f64>,
}

impl<'a, S: MatchStore> PastPerformanceCache<'a, S> {
    pub fn new(store: &'a S, worker_id: UserId) -> Self {
        Self {
            store,
            worker_id,
            ratios: HashMap::new(),
        }
    }

    pub async fn ratio(&mut self, organizer_id: UserId) -> Result<f64, StoreError> {
        if let Some(ratio) = self.ratios.get(&organizer_id) {
            return Ok(*ratio);
        }

        let history = self
            .store
            .fetch_terminal_applications(self.worker_id)
            .await?;
        let ratio = completion_ratio(&history, organizer_id);
        debug!(
            worker_id = self.worker_id,
            organizer_id,
            records = history.len(),
            ratio,
            "computed past performance"
        );

        self.ratios.insert(organizer_id, ratio);
        Ok(ratio)
    }
}
