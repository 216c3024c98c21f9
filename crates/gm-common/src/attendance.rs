use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::reliability::{ReliabilityError, recompute_reliability};
use crate::store::{AttendanceStore, JobCounter, StoreError};
use crate::{
    ApplicationId, ApplicationRecord, ApplicationStatus, AttendanceEvent, AttendanceKind,
    GeoPoint, JobId, UserId,
};

#[derive(Debug, thiserror::Error)]
pub enum AttendanceError {
    #[error("no accepted application for job {job_id} and worker {worker_id}")]
    ApplicationNotAccepted {
        job_id: JobId,
        worker_id: UserId,
        status: Option<ApplicationStatus>,
    },
    #[error("application {0} not found")]
    ApplicationNotFound(ApplicationId),
    #[error("reliability update failed: {0}")]
    Reliability(#[from] ReliabilityError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct AttendanceOutcome {
    pub application: ApplicationRecord,
    /// Set when this event completed the job and the score was recomputed.
    pub reliability_score: Option<f64>,
}

/// Hours between the i-th check-in and the i-th check-out, summed.
/// `None` while a check-in is still open.
pub fn paired_hours(events: &[AttendanceEvent]) -> Option<f64> {
    let check_ins: Vec<_> = events
        .iter()
        .filter(|e| e.kind == AttendanceKind::CheckIn)
        .map(|e| e.timestamp)
        .collect();
    let check_outs: Vec<_> = events
        .iter()
        .filter(|e| e.kind == AttendanceKind::CheckOut)
        .map(|e| e.timestamp)
        .collect();

    if check_ins.len() != check_outs.len() {
        return None;
    }

    let millis: i64 = check_ins
        .iter()
        .zip(&check_outs)
        .map(|(start, end)| (*end - *start).num_milliseconds())
        .sum();
    Some(millis as f64 / 3_600_000.0)
}

/// Record a check-in or check-out on the worker's accepted application.
///
/// A check-out that closes every open check-in completes the application,
/// bumps the worker's completed counter and recomputes their reliability.
#[instrument(skip(store, location))]
pub async fn record_attendance<S: AttendanceStore>(
    store: &S,
    job_id: JobId,
    worker_id: UserId,
    kind: AttendanceKind,
    at: DateTime<Utc>,
    location: Option<GeoPoint>,
) -> Result<AttendanceOutcome, AttendanceError> {
    let mut application = store
        .fetch_application(job_id, worker_id)
        .await?
        .filter(|app| app.status == ApplicationStatus::Accepted)
        .ok_or(AttendanceError::ApplicationNotAccepted {
            job_id,
            worker_id,
            status: None,
        })?;

    application.check_in_timestamps.push(AttendanceEvent {
        kind,
        timestamp: at,
        location,
    });

    let completed_hours = match kind {
        AttendanceKind::CheckOut => paired_hours(&application.check_in_timestamps),
        AttendanceKind::CheckIn => None,
    };
    if let Some(hours) = completed_hours {
        application.hours_worked = Some(hours);
        application.status = ApplicationStatus::Completed;
    }

    store.save_application(&application).await?;

    let Some(hours) = completed_hours else {
        return Ok(AttendanceOutcome {
            application,
            reliability_score: None,
        });
    };

    store
        .increment_counter(worker_id, JobCounter::Completed)
        .await?;
    let score = recompute_reliability(store, worker_id).await?;
    info!(
        application_id = application.id,
        job_id,
        worker_id,
        hours_worked = hours,
        reliability_score = score,
        "application completed"
    );

    Ok(AttendanceOutcome {
        application,
        reliability_score: Some(score),
    })
}

/// Mark an accepted application as a no-show and penalize the worker.
#[instrument(skip(store))]
pub async fn record_no_show<S: AttendanceStore>(
    store: &S,
    application_id: ApplicationId,
) -> Result<AttendanceOutcome, AttendanceError> {
    let mut application = store
        .fetch_application_by_id(application_id)
        .await?
        .ok_or(AttendanceError::ApplicationNotFound(application_id))?;

    if application.status != ApplicationStatus::Accepted {
        return Err(AttendanceError::ApplicationNotAccepted {
            job_id: application.job_id,
            worker_id: application.pro_id,
            status: Some(application.status),
        });
    }

    application.status = ApplicationStatus::NoShow;
    store.save_application(&application).await?;
    store
        .increment_counter(application.pro_id, JobCounter::NoShow)
        .await?;
    let score = recompute_reliability(store, application.pro_id).await?;

    info!(
        application_id,
        worker_id = application.pro_id,
        reliability_score = score,
        "no-show recorded"
    );
    Ok(AttendanceOutcome {
        application,
        reliability_score: Some(score),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WorkerStats;
    use crate::store::InMemoryStore;
    use chrono::{Duration, TimeZone};

    fn t(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 8, hour, minute, 0).unwrap()
    }

    fn event(kind: AttendanceKind, at: DateTime<Utc>) -> AttendanceEvent {
        AttendanceEvent {
            kind,
            timestamp: at,
            location: None,
        }
    }

    fn store_with(status: ApplicationStatus) -> InMemoryStore {
        let store = InMemoryStore::new();
        let mut stats = WorkerStats::new(2);
        stats.completed_jobs_count = 3;
        store.insert_worker(stats, None);
        store.insert_application(ApplicationRecord::new(1, 10, 2, status));
        store
    }

    #[test]
    fn pairs_check_ins_with_check_outs_in_order() {
        let events = vec![
            event(AttendanceKind::CheckIn, t(9, 0)),
            event(AttendanceKind::CheckOut, t(12, 0)),
            event(AttendanceKind::CheckIn, t(13, 0)),
            event(AttendanceKind::CheckOut, t(17, 30)),
        ];
        assert_eq!(paired_hours(&events), Some(7.5));
    }

    #[test]
    fn open_check_in_has_no_hours() {
        let events = vec![
            event(AttendanceKind::CheckIn, t(9, 0)),
            event(AttendanceKind::CheckOut, t(12, 0)),
            event(AttendanceKind::CheckIn, t(13, 0)),
        ];
        assert_eq!(paired_hours(&events), None);
    }

    #[tokio::test]
    async fn check_in_only_appends_event() {
        let store = store_with(ApplicationStatus::Accepted);

        let outcome = record_attendance(&store, 10, 2, AttendanceKind::CheckIn, t(9, 0), None)
            .await
            .unwrap();

        assert_eq!(outcome.application.status, ApplicationStatus::Accepted);
        assert_eq!(outcome.reliability_score, None);
        assert_eq!(store.application(1).unwrap().check_in_timestamps.len(), 1);
        assert_eq!(store.stats(2).unwrap().completed_jobs_count, 3);
    }

    #[tokio::test]
    async fn closing_check_out_completes_and_updates_reliability() {
        let store = store_with(ApplicationStatus::Accepted);
        let site = Some(GeoPoint::new(35.0, 139.0));

        record_attendance(&store, 10, 2, AttendanceKind::CheckIn, t(9, 0), site)
            .await
            .unwrap();
        let outcome = record_attendance(
            &store,
            10,
            2,
            AttendanceKind::CheckOut,
            t(9, 0) + Duration::minutes(390),
            site,
        )
        .await
        .unwrap();

        let saved = store.application(1).unwrap();
        assert_eq!(saved.status, ApplicationStatus::Completed);
        assert_eq!(saved.hours_worked, Some(6.5));
        assert_eq!(outcome.reliability_score, Some(1.0));

        let stats = store.stats(2).unwrap();
        assert_eq!(stats.completed_jobs_count, 4);
        assert_eq!(stats.reliability_score, Some(1.0));
    }

    #[tokio::test]
    async fn rejects_application_that_is_not_accepted() {
        let store = store_with(ApplicationStatus::Pending);

        let err = record_attendance(&store, 10, 2, AttendanceKind::CheckIn, t(9, 0), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AttendanceError::ApplicationNotAccepted { job_id: 10, worker_id: 2, .. }
        ));

        let err = record_attendance(&store, 11, 2, AttendanceKind::CheckIn, t(9, 0), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AttendanceError::ApplicationNotAccepted { .. }));
    }

    #[tokio::test]
    async fn recompute_failure_propagates() {
        let store = store_with(ApplicationStatus::Accepted);
        store.fail_saves_for(2);

        record_attendance(&store, 10, 2, AttendanceKind::CheckIn, t(9, 0), None)
            .await
            .unwrap();
        let err = record_attendance(&store, 10, 2, AttendanceKind::CheckOut, t(10, 0), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AttendanceError::Reliability(_)));
        // The completion itself was persisted before the recompute.
        assert_eq!(
            store.application(1).unwrap().status,
            ApplicationStatus::Completed
        );
    }

    #[tokio::test]
    async fn no_show_penalizes_worker() {
        let store = store_with(ApplicationStatus::Accepted);

        let outcome = record_no_show(&store, 1).await.unwrap();

        // 3/4 completion minus 0.1
        let score = outcome.reliability_score.unwrap();
        assert!((score - 0.65).abs() < 1e-9);
        assert_eq!(store.application(1).unwrap().status, ApplicationStatus::NoShow);
        assert_eq!(store.stats(2).unwrap().no_show_count, 1);
    }

    #[tokio::test]
    async fn no_show_requires_accepted_application() {
        let store = store_with(ApplicationStatus::Completed);

        let err = record_no_show(&store, 1).await.unwrap_err();
        assert!(matches!(
            err,
            AttendanceError::ApplicationNotAccepted {
                status: Some(ApplicationStatus::Completed),
                ..
            }
        ));

        let err = record_no_show(&store, 99).await.unwrap_err();
        assert!(matches!(err, AttendanceError::ApplicationNotFound(99)));
    }
}
