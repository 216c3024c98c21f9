use chrono::{DateTime, Utc};
use deadpool_postgres::GenericClient;
use tokio_postgres::Row;
use tracing::warn;

use crate::db::profiles::geo_point;
use crate::db::util::TimedClientExt;
use crate::store::StoreError;
use crate::{JobId, JobPosting};

fn job_from_row(row: &Row) -> JobPosting {
    JobPosting {
        id: row.get("id"),
        organizer_id: row.get("organizer_id"),
        title: row.get("title"),
        required_skills: row.get("required_skills"),
        location: geo_point(row.get("lat"), row.get("lng")),
        date_start: row.get("date_start"),
        date_end: row.get("date_end"),
    }
}

/// Drop postings whose window is inverted; scoring assumes `date_end > date_start`.
fn valid_only(job: JobPosting) -> Option<JobPosting> {
    match job.validate() {
        Ok(()) => Some(job),
        Err(err) => {
            warn!(job_id = job.id, error = %err, "skipping invalid job");
            None
        }
    }
}

/// Open jobs starting after `after`, soonest first. This is the candidate
/// list handed to ranking; discovery filters beyond that are out of scope.
pub async fn fetch_open_jobs(
    client: &impl GenericClient,
    after: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<JobPosting>, StoreError> {
    let rows = client
        .timed_query(
            "SELECT id, organizer_id, title, required_skills, lat, lng, date_start, date_end
             FROM gm.jobs
             WHERE status = 'open' AND date_start > $1
             ORDER BY date_start, id
             LIMIT $2",
            &[&after, &limit],
            "fetch_open_jobs",
        )
        .await?;

    Ok(rows.iter().map(job_from_row).filter_map(valid_only).collect())
}

pub async fn fetch_job(
    client: &impl GenericClient,
    id: JobId,
) -> Result<Option<JobPosting>, StoreError> {
    let row = client
        .timed_query_opt(
            "SELECT id, organizer_id, title, required_skills, lat, lng, date_start, date_end
             FROM gm.jobs
             WHERE id = $1",
            &[&id],
            "fetch_job",
        )
        .await?;

    Ok(row.as_ref().map(job_from_row).and_then(valid_only))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn posting(hours: i64) -> JobPosting {
        let start = Utc.with_ymd_and_hms(2024, 6, 8, 10, 0, 0).unwrap();
        JobPosting {
            id: 4,
            organizer_id: 1,
            title: "load-out".into(),
            required_skills: vec![],
            location: None,
            date_start: start,
            date_end: start + Duration::hours(hours),
        }
    }

    #[test]
    fn inverted_or_empty_windows_are_skipped() {
        assert!(valid_only(posting(3)).is_some());
        assert!(valid_only(posting(0)).is_none());
        assert!(valid_only(posting(-2)).is_none());
    }
}
