use chrono::{DateTime, Duration, TimeZone, Utc};
use gm_common::attendance::{record_attendance, record_no_show};
use gm_common::matching::rank_jobs_at;
use gm_common::reliability::{compute_reliability_score, recompute_reliability, run_reliability_sweep};
use gm_common::store::InMemoryStore;
use gm_common::{
    ApplicationRecord, ApplicationStatus, AttendanceKind, JobPosting, WorkerProfile, WorkerStats,
};

fn job(id: i64, organizer_id: i64) -> JobPosting {
    let start = Utc.with_ymd_and_hms(2024, 6, 8, 10, 0, 0).unwrap();
    JobPosting {
        id,
        organizer_id,
        title: String::new(),
        required_skills: vec!["sound".into()],
        location: None,
        date_start: start,
        date_end: start + Duration::hours(4),
    }
}

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 8, hour, 0, 0).unwrap()
}

fn worker(store: &InMemoryStore, id: i64, completed: u32, no_show: u32) {
    let mut stats = WorkerStats::new(id);
    stats.completed_jobs_count = completed;
    stats.no_show_count = no_show;
    let profile = WorkerProfile {
        user_id: id,
        skills: vec!["sound".into()],
        ..WorkerProfile::default()
    };
    store.insert_worker(stats, Some(profile));
}

#[test]
fn reference_scores() {
    assert_eq!(compute_reliability_score(0, 0), 1.0);
    assert!((compute_reliability_score(8, 2) - 0.6).abs() < 1e-9);
    assert_eq!(compute_reliability_score(1, 9), 0.0);
}

#[tokio::test]
async fn recompute_is_idempotent() {
    let store = InMemoryStore::new();
    worker(&store, 1, 8, 2);

    let first = recompute_reliability(&store, 1).await.unwrap();
    let second = recompute_reliability(&store, 1).await.unwrap();

    assert_eq!(first, second);
    assert!((first - 0.6).abs() < 1e-9);
}

#[tokio::test]
async fn attendance_feeds_back_into_ranking() {
    let store = InMemoryStore::new();
    worker(&store, 1, 0, 0);
    store.insert_organizer(50);
    for id in [1, 2, 3] {
        store.insert_job(job(id, 50));
    }
    store.insert_application(ApplicationRecord::new(1, 1, 1, ApplicationStatus::Accepted));
    store.insert_application(ApplicationRecord::new(2, 2, 1, ApplicationStatus::Accepted));

    record_attendance(&store, 1, 1, AttendanceKind::CheckIn, at(10), None)
        .await
        .unwrap();
    let done = record_attendance(&store, 1, 1, AttendanceKind::CheckOut, at(14), None)
        .await
        .unwrap();
    assert_eq!(done.application.hours_worked, Some(4.0));
    assert_eq!(done.reliability_score, Some(1.0));

    let missed = record_no_show(&store, 2).await.unwrap();
    // 1/2 completion minus 0.1
    assert!((missed.reliability_score.unwrap() - 0.4).abs() < 1e-9);

    let stats = store.stats(1).unwrap();
    assert_eq!((stats.completed_jobs_count, stats.no_show_count), (1, 1));

    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let ranked = rank_jobs_at(&store, vec![job(3, 50)], 1, now).await;
    let breakdown = ranked[0].score_breakdown.as_ref().unwrap();
    assert!((breakdown.reliability - 0.4).abs() < 1e-9);
    assert_eq!(breakdown.past_performance, 0.5);
}

#[tokio::test]
async fn nightly_sweep_reconciles_every_worker() {
    let store = InMemoryStore::new();
    worker(&store, 1, 8, 2);
    worker(&store, 2, 1, 9);
    worker(&store, 3, 0, 0);
    store.insert_organizer(4);
    store.fail_saves_for(2);

    let report = run_reliability_sweep(&store).await.unwrap();

    assert_eq!(report.processed, 3);
    assert_eq!(report.updated, 2);
    assert_eq!(report.failed_user_ids, vec![2]);
    assert!((store.stats(1).unwrap().reliability_score.unwrap() - 0.6).abs() < 1e-9);
    assert_eq!(store.stats(3).unwrap().reliability_score, Some(1.0));
}
