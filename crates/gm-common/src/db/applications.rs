use deadpool_postgres::GenericClient;
use tokio_postgres::{Row, types::Json};

use crate::db::util::TimedClientExt;
use crate::store::StoreError;
use crate::{
    ApplicationId, ApplicationRecord, ApplicationStatus, AttendanceEvent, JobId,
    TerminalApplication, UserId,
};

const APPLICATION_COLUMNS: &str =
    "id, job_id, pro_id, status, check_in_timestamps, hours_worked";

fn parse_status(raw: &str) -> Result<ApplicationStatus, StoreError> {
    ApplicationStatus::parse(raw)
        .ok_or_else(|| StoreError::Mapping(format!("unknown application status {raw:?}")))
}

fn application_from_row(row: &Row) -> Result<ApplicationRecord, StoreError> {
    let events: Json<Vec<AttendanceEvent>> = row
        .try_get("check_in_timestamps")
        .map_err(|e| StoreError::Mapping(format!("check_in_timestamps: {e}")))?;

    Ok(ApplicationRecord {
        id: row.get("id"),
        job_id: row.get("job_id"),
        pro_id: row.get("pro_id"),
        status: parse_status(row.get("status"))?,
        check_in_timestamps: events.0,
        hours_worked: row.get("hours_worked"),
    })
}

pub async fn fetch_terminal_applications(
    client: &impl GenericClient,
    pro_id: UserId,
) -> Result<Vec<TerminalApplication>, StoreError> {
    let rows = client
        .timed_query(
            "SELECT a.job_id, j.organizer_id, a.status
             FROM gm.applications a
             JOIN gm.jobs j ON j.id = a.job_id
             WHERE a.pro_id = $1 AND a.status IN ('completed', 'no-show')",
            &[&pro_id],
            "fetch_terminal_applications",
        )
        .await?;

    rows.iter()
        .map(|row| {
            Ok(TerminalApplication {
                job_id: row.get("job_id"),
                organizer_id: row.get("organizer_id"),
                status: parse_status(row.get("status"))?,
            })
        })
        .collect()
}

pub async fn fetch_application(
    client: &impl GenericClient,
    job_id: JobId,
    pro_id: UserId,
) -> Result<Option<ApplicationRecord>, StoreError> {
    let sql = format!(
        "SELECT {APPLICATION_COLUMNS} FROM gm.applications WHERE job_id = $1 AND pro_id = $2"
    );
    let row = client
        .timed_query_opt(&sql, &[&job_id, &pro_id], "fetch_application")
        .await?;

    row.as_ref().map(application_from_row).transpose()
}

pub async fn fetch_application_by_id(
    client: &impl GenericClient,
    id: ApplicationId,
) -> Result<Option<ApplicationRecord>, StoreError> {
    let sql = format!("SELECT {APPLICATION_COLUMNS} FROM gm.applications WHERE id = $1");
    let row = client
        .timed_query_opt(&sql, &[&id], "fetch_application_by_id")
        .await?;

    row.as_ref().map(application_from_row).transpose()
}

pub async fn save_application(
    client: &impl GenericClient,
    application: &ApplicationRecord,
) -> Result<(), StoreError> {
    let updated = client
        .timed_execute(
            "UPDATE gm.applications
             SET status = $2, check_in_timestamps = $3, hours_worked = $4
             WHERE id = $1",
            &[
                &application.id,
                &application.status.as_str(),
                &Json(&application.check_in_timestamps),
                &application.hours_worked,
            ],
            "save_application",
        )
        .await?;

    if updated == 0 {
        return Err(StoreError::NotFound(format!(
            "application {}",
            application.id
        )));
    }
    Ok(())
}
