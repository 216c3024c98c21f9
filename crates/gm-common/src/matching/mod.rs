pub mod availability;
pub mod distance;
pub mod history;
pub mod pipeline;
pub mod recency;
pub mod scoring;
pub mod skills;
pub mod weights;

pub use pipeline::{rank_jobs, rank_jobs_at};
pub use scoring::{MatchScore, MatchScorer, MatchingConfig, WorkerContext};
