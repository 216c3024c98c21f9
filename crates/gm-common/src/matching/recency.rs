use chrono::{DateTime, Utc};

/// Multiplier applied to the whole match score based on how recently the
/// worker was active. A missing timestamp counts as active now.
///
/// Inactivity is counted in whole days (floored), so 7 days 23 hours is
/// still 7 days and keeps the full multiplier.
pub fn recency_multiplier(last_active: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let last_active = last_active.unwrap_or(now);
    let days = (now - last_active).num_days().max(0);

    match days {
        0..=7 => 1.0,
        8..=30 => 0.8,
        31..=90 => 0.5,
        _ => 0.2,
    }
}
