use serde::{Deserialize, Serialize};

use crate::JobPosting;
use crate::matching::MatchScore;

/// A job as returned to the worker's job list.
///
/// `match_score` is `None` when the list could not be ranked; callers then
/// show the jobs in the order they were supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedJob {
    #[serde(flatten)]
    pub job: JobPosting,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<u8>,
    #[serde(default)]
    pub matching_skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_breakdown: Option<ScoreBreakdown>,
}

impl RankedJob {
    pub fn unscored(job: JobPosting) -> Self {
        Self {
            job,
            match_score: None,
            matching_skills: Vec::new(),
            score_breakdown: None,
        }
    }

    pub fn scored(job: JobPosting, score: MatchScore) -> Self {
        let breakdown = ScoreBreakdown::from(&score);
        Self {
            job,
            match_score: Some(score.match_score),
            matching_skills: score.matching_skills,
            score_breakdown: Some(breakdown),
        }
    }
}

/// Per-factor raw sub-scores (0.0-1.0) behind a match score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub skills: f64,
    pub distance: f64,
    pub rating: f64,
    pub reliability: f64,
    pub availability: f64,
    pub past_performance: f64,
    /// Weighted sum before the recency multiplier.
    pub weighted_total: f64,
    pub recency: f64,
}

impl From<&MatchScore> for ScoreBreakdown {
    fn from(value: &MatchScore) -> Self {
        Self {
            skills: value.skills.score,
            distance: value.distance.score,
            rating: value.rating.score,
            reliability: value.reliability.score,
            availability: value.availability.score,
            past_performance: value.past_performance.score,
            weighted_total: value.weighted_total,
            recency: value.recency,
        }
    }
}
