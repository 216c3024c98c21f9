use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{
    availability::availability_score,
    distance::haversine_km,
    recency::recency_multiplier,
    skills::match_required_skills,
    weights::{MATCH_WEIGHTS, Weights},
};
use crate::{JobPosting, WorkerProfile, WorkerStats};

/// Reliability assumed for workers without a stored score.
pub const DEFAULT_RELIABILITY: f64 = 1.0;
const NEUTRAL_SCORE: f64 = 0.5;
const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone)]
pub struct MatchingConfig {
    pub weights: Weights,
    /// Distance at which the proximity score reaches zero.
    pub distance_cutoff_km: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            weights: MATCH_WEIGHTS,
            distance_cutoff_km: 50.0,
        }
    }
}

/// Everything known about the worker being ranked for.
#[derive(Debug, Clone)]
pub struct WorkerContext {
    pub profile: WorkerProfile,
    pub stats: WorkerStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoringResult {
    /// Raw sub-score in [0, 1] before weighting.
    pub score: f64,
    pub weight: f64,
    pub status: &'static str,
    pub details: String,
}

impl ScoringResult {
    pub fn contribution(&self) -> f64 {
        self.score * self.weight
    }
}

#[derive(Debug, Clone)]
pub struct MatchScore {
    /// Weighted sum of the six factors, before recency.
    pub weighted_total: f64,
    pub recency: f64,
    /// Final 0-100 score.
    pub match_score: u8,
    pub matching_skills: Vec<String>,
    pub skills: ScoringResult,
    pub distance: ScoringResult,
    pub rating: ScoringResult,
    pub reliability: ScoringResult,
    pub availability: ScoringResult,
    pub past_performance: ScoringResult,
}

pub struct MatchScorer {
    config: MatchingConfig,
}

impl Default for MatchScorer {
    fn default() -> Self {
        Self::new(MatchingConfig::default())
    }
}

impl MatchScorer {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    /// Score one job for one worker. `past_performance` comes from the
    /// store-backed aggregator; everything else is computed here.
    pub fn calculate_match_score(
        &self,
        job: &JobPosting,
        worker: &WorkerContext,
        past_performance: f64,
        now: DateTime<Utc>,
    ) -> MatchScore {
        let weights = self.config.weights;
        let skill_match = match_required_skills(&job.required_skills, &worker.profile.skills);

        let skills = ScoringResult {
            score: skill_match.match_percentage,
            weight: weights.skills,
            status: status_from_score(skill_match.match_percentage, false),
            details: skill_match.reason,
        };
        let distance = self.score_distance(job, &worker.profile);
        let rating = self.score_rating(&worker.stats);
        let reliability = self.score_reliability(&worker.stats);
        let availability = self.score_availability(job, &worker.profile);
        let past_performance = ScoringResult {
            score: past_performance,
            weight: weights.past_performance,
            status: status_from_score(past_performance, false),
            details: format!("completion ratio with organizer {}", job.organizer_id),
        };

        let weighted_total = skills.contribution()
            + distance.contribution()
            + rating.contribution()
            + reliability.contribution()
            + availability.contribution()
            + past_performance.contribution();
        let recency = recency_multiplier(worker.stats.last_active_date, now);

        MatchScore {
            weighted_total,
            recency,
            match_score: to_match_score(weighted_total * recency),
            matching_skills: skill_match.matched_skills,
            skills,
            distance,
            rating,
            reliability,
            availability,
            past_performance,
        }
    }

    fn score_distance(&self, job: &JobPosting, profile: &WorkerProfile) -> ScoringResult {
        let weight = self.config.weights.distance;

        let (Some(worker_at), Some(job_at)) = (profile.location, job.location) else {
            return ScoringResult {
                score: NEUTRAL_SCORE,
                weight,
                status: "UNKNOWN",
                details: "location missing on worker or job".into(),
            };
        };

        let km = haversine_km(worker_at, job_at);
        let score = (1.0 - km / self.config.distance_cutoff_km).max(0.0);

        ScoringResult {
            score,
            weight,
            status: status_from_score(score, false),
            details: format!("{km:.1}km away"),
        }
    }

    fn score_rating(&self, stats: &WorkerStats) -> ScoringResult {
        let weight = self.config.weights.rating;
        match stats.rating_avg {
            Some(rating) => {
                let score = rating / MAX_RATING;
                ScoringResult {
                    score,
                    weight,
                    status: status_from_score(score, false),
                    details: format!("rated {rating:.1}/5"),
                }
            }
            None => ScoringResult {
                score: 0.0,
                weight,
                status: "UNKNOWN",
                details: "no rating yet".into(),
            },
        }
    }

    fn score_reliability(&self, stats: &WorkerStats) -> ScoringResult {
        let weight = self.config.weights.reliability;
        let score = stats.reliability_score.unwrap_or(DEFAULT_RELIABILITY);

        ScoringResult {
            score,
            weight,
            status: status_from_score(score, stats.reliability_score.is_none()),
            details: format!(
                "reliability {score:.2} ({} completed / {} no-show)",
                stats.completed_jobs_count, stats.no_show_count
            ),
        }
    }

    fn score_availability(&self, job: &JobPosting, profile: &WorkerProfile) -> ScoringResult {
        let score = availability_score(&profile.availability_windows, job.date_start, job.date_end);
        let undeclared = profile.availability_windows.is_empty();

        ScoringResult {
            score,
            weight: self.config.weights.availability,
            status: status_from_score(score, undeclared),
            details: if undeclared {
                "no availability declared".into()
            } else if score >= 1.0 {
                "fits a declared window".into()
            } else {
                "outside declared windows".into()
            },
        }
    }
}

/// Scale to 0-100, round half up, clamp.
fn to_match_score(total: f64) -> u8 {
    (total * 100.0).round().clamp(0.0, 100.0) as u8
}

fn status_from_score(score: f64, unknown: bool) -> &'static str {
    if unknown {
        "UNKNOWN"
    } else if score >= 0.9 {
        "PERFECT_MATCH"
    } else if score >= 0.7 {
        "MATCH"
    } else if score >= 0.4 {
        "PARTIAL_MATCH"
    } else {
        "MISS"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AvailabilityWindow, GeoPoint};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn minimal_worker(skills: &[&str]) -> WorkerContext {
        WorkerContext {
            profile: WorkerProfile {
                user_id: 1,
                skills: skills.iter().map(|s| s.to_string()).collect(),
                ..WorkerProfile::default()
            },
            stats: WorkerStats::new(1),
        }
    }

    fn job(required: &[&str]) -> JobPosting {
        // Saturday 2024-06-08 10:00-16:00
        let start = Utc.with_ymd_and_hms(2024, 6, 8, 10, 0, 0).unwrap();
        JobPosting {
            id: 100,
            organizer_id: 9,
            title: "festival crew".into(),
            required_skills: required.iter().map(|s| s.to_string()).collect(),
            location: None,
            date_start: start,
            date_end: start + Duration::hours(6),
        }
    }

    #[test]
    fn minimal_fixture_sums_neutral_components() {
        let scorer = MatchScorer::default();
        let worker = minimal_worker(&["sound", "lighting"]);

        let score = scorer.calculate_match_score(&job(&["sound", "rigging"]), &worker, 0.5, now());

        assert_eq!(score.matching_skills, vec!["sound".to_string()]);
        assert_eq!(score.skills.score, 0.5);
        assert!((score.skills.contribution() - 0.175).abs() < 1e-12);
        assert!((score.distance.contribution() - 0.075).abs() < 1e-12);
        assert_eq!(score.rating.contribution(), 0.0);
        assert!((score.reliability.contribution() - 0.15).abs() < 1e-12);
        assert!((score.availability.contribution() - 0.05).abs() < 1e-12);
        assert!((score.past_performance.contribution() - 0.05).abs() < 1e-12);
        assert!((score.weighted_total - 0.5).abs() < 1e-9);
        assert_eq!(score.recency, 1.0);
        assert_eq!(score.match_score, 50);
    }

    #[test]
    fn perfect_worker_scores_100() {
        let scorer = MatchScorer::default();
        let site = GeoPoint::new(35.68, 139.76);
        let mut worker = minimal_worker(&["sound"]);
        worker.profile.location = Some(site);
        worker.profile.availability_windows = vec![AvailabilityWindow::new(6, "08:00", "20:00")];
        worker.stats.rating_avg = Some(5.0);
        worker.stats.reliability_score = Some(1.0);
        worker.stats.last_active_date = Some(now());

        let mut posting = job(&["sound"]);
        posting.location = Some(site);

        let score = scorer.calculate_match_score(&posting, &worker, 1.0, now());
        assert_eq!(score.match_score, 100);
        assert_eq!(score.availability.status, "PERFECT_MATCH");
    }

    #[test]
    fn distance_ramps_to_zero_at_cutoff() {
        let scorer = MatchScorer::default();
        let mut worker = minimal_worker(&[]);
        worker.profile.location = Some(GeoPoint::new(0.0, 0.0));

        let mut near = job(&[]);
        near.location = Some(GeoPoint::new(0.0, 0.0));
        let mut far = job(&[]);
        far.location = Some(GeoPoint::new(1.0, 0.0)); // ~111km

        assert_eq!(scorer.score_distance(&near, &worker.profile).score, 1.0);
        assert_eq!(scorer.score_distance(&far, &worker.profile).score, 0.0);

        let mut mid = job(&[]);
        mid.location = Some(GeoPoint::new(0.2248, 0.0)); // ~25km
        let mid_score = scorer.score_distance(&mid, &worker.profile).score;
        assert!((mid_score - 0.5).abs() < 0.01, "got {mid_score}");
    }

    #[test]
    fn missing_location_on_either_side_is_neutral() {
        let scorer = MatchScorer::default();
        let mut worker = minimal_worker(&[]);
        let mut posting = job(&[]);
        posting.location = Some(GeoPoint::new(1.0, 1.0));

        let result = scorer.score_distance(&posting, &worker.profile);
        assert_eq!(result.score, 0.5);
        assert_eq!(result.status, "UNKNOWN");

        worker.profile.location = Some(GeoPoint::new(1.0, 1.0));
        posting.location = None;
        assert_eq!(scorer.score_distance(&posting, &worker.profile).score, 0.5);
    }

    #[test]
    fn empty_required_skills_count_as_full_match() {
        let scorer = MatchScorer::default();
        let score = scorer.calculate_match_score(&job(&[]), &minimal_worker(&[]), 0.5, now());
        assert_eq!(score.skills.score, 1.0);
        assert!(score.matching_skills.is_empty());
    }

    #[test]
    fn rating_scales_by_five_and_missing_is_zero() {
        let scorer = MatchScorer::default();
        let mut stats = WorkerStats::new(1);
        assert_eq!(scorer.score_rating(&stats).score, 0.0);

        stats.rating_avg = Some(4.0);
        assert!((scorer.score_rating(&stats).score - 0.8).abs() < 1e-12);
    }

    #[test]
    fn missing_reliability_defaults_to_trusted() {
        let scorer = MatchScorer::default();
        let mut stats = WorkerStats::new(1);
        let result = scorer.score_reliability(&stats);
        assert_eq!(result.score, 1.0);
        assert_eq!(result.status, "UNKNOWN");

        stats.reliability_score = Some(0.25);
        assert_eq!(scorer.score_reliability(&stats).score, 0.25);
    }

    #[test]
    fn inactive_worker_is_dampened_uniformly() {
        let scorer = MatchScorer::default();
        let mut worker = minimal_worker(&["sound", "lighting"]);
        worker.stats.last_active_date = Some(now() - Duration::days(100));

        let score = scorer.calculate_match_score(&job(&["sound", "rigging"]), &worker, 0.5, now());

        assert_eq!(score.recency, 0.2);
        assert_eq!(
            score.match_score,
            (score.weighted_total * 0.2 * 100.0).round() as u8
        );
        assert_eq!(score.match_score, 10);
    }

    #[test]
    fn match_score_rounds_and_clamps() {
        assert_eq!(to_match_score(0.0), 0);
        assert_eq!(to_match_score(0.494), 49);
        assert_eq!(to_match_score(0.496), 50);
        assert_eq!(to_match_score(1.2), 100);
        assert_eq!(to_match_score(-0.1), 0);
    }
}
