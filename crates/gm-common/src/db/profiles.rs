use deadpool_postgres::GenericClient;
use tokio_postgres::{Row, types::Json};

use crate::db::util::TimedClientExt;
use crate::store::StoreError;
use crate::{AvailabilityWindow, GeoPoint, UserId, WorkerProfile};

/// A point only when both coordinates are present.
pub(crate) fn geo_point(lat: Option<f64>, lng: Option<f64>) -> Option<GeoPoint> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
        _ => None,
    }
}

fn profile_from_row(row: &Row) -> Result<WorkerProfile, StoreError> {
    let windows: Json<Vec<AvailabilityWindow>> = row
        .try_get("availability_windows")
        .map_err(|e| StoreError::Mapping(format!("availability_windows: {e}")))?;

    Ok(WorkerProfile {
        user_id: row.get("user_id"),
        skills: row.get("skills"),
        location: geo_point(row.get("lat"), row.get("lng")),
        availability_windows: windows.0,
    })
}

pub async fn fetch_profile(
    client: &impl GenericClient,
    user_id: UserId,
) -> Result<Option<WorkerProfile>, StoreError> {
    let row = client
        .timed_query_opt(
            "SELECT user_id, skills, lat, lng, availability_windows
             FROM gm.profiles
             WHERE user_id = $1",
            &[&user_id],
            "fetch_profile",
        )
        .await?;

    row.as_ref().map(profile_from_row).transpose()
}
