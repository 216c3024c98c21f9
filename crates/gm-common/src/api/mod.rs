pub mod ranked_job;

pub use ranked_job::{RankedJob, ScoreBreakdown};
