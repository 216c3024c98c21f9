use deadpool_postgres::GenericClient;
use tokio_postgres::Row;

use crate::db::util::TimedClientExt;
use crate::store::{JobCounter, StoreError};
use crate::{UserId, WorkerStats};

fn counter(row: &Row, column: &str) -> Result<u32, StoreError> {
    let raw: i32 = row.get(column);
    u32::try_from(raw).map_err(|_| StoreError::Mapping(format!("{column} is negative: {raw}")))
}

fn stats_from_row(row: &Row) -> Result<WorkerStats, StoreError> {
    Ok(WorkerStats {
        user_id: row.get("id"),
        rating_avg: row.get("rating_avg"),
        reliability_score: row.get("reliability_score"),
        last_active_date: row.get("last_active_date"),
        completed_jobs_count: counter(row, "completed_jobs_count")?,
        no_show_count: counter(row, "no_show_count")?,
    })
}

pub async fn fetch_worker_stats(
    client: &impl GenericClient,
    user_id: UserId,
) -> Result<Option<WorkerStats>, StoreError> {
    let row = client
        .timed_query_opt(
            "SELECT id, rating_avg, reliability_score, last_active_date,
                    completed_jobs_count, no_show_count
             FROM gm.users
             WHERE id = $1",
            &[&user_id],
            "fetch_worker_stats",
        )
        .await?;

    row.as_ref().map(stats_from_row).transpose()
}

pub async fn save_reliability_score(
    client: &impl GenericClient,
    user_id: UserId,
    score: f64,
) -> Result<(), StoreError> {
    let updated = client
        .timed_execute(
            "UPDATE gm.users SET reliability_score = $2 WHERE id = $1",
            &[&user_id, &score],
            "save_reliability_score",
        )
        .await?;

    if updated == 0 {
        return Err(StoreError::NotFound(format!("user {user_id}")));
    }
    Ok(())
}

pub async fn list_worker_ids(client: &impl GenericClient) -> Result<Vec<UserId>, StoreError> {
    let rows = client
        .timed_query(
            "SELECT id FROM gm.users WHERE role = 'worker' ORDER BY id",
            &[],
            "list_worker_ids",
        )
        .await?;

    Ok(rows.iter().map(|row| row.get("id")).collect())
}

fn increment_sql(counter: JobCounter) -> String {
    let column = counter.column();
    format!("UPDATE gm.users SET {column} = {column} + 1 WHERE id = $1")
}

/// Single-statement increment; concurrent callers each land their +1.
pub async fn increment_counter(
    client: &impl GenericClient,
    user_id: UserId,
    counter: JobCounter,
) -> Result<(), StoreError> {
    let updated = client
        .timed_execute(&increment_sql(counter), &[&user_id], counter.column())
        .await?;

    if updated == 0 {
        return Err(StoreError::NotFound(format!("user {user_id}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_targets_a_single_column() {
        assert_eq!(
            increment_sql(JobCounter::NoShow),
            "UPDATE gm.users SET no_show_count = no_show_count + 1 WHERE id = $1"
        );
        assert!(increment_sql(JobCounter::Completed).contains("completed_jobs_count + 1"));
    }
}
