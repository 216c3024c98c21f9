/// Ranking weights for the job list a worker sees.
/// Six additive factors; recency is applied afterwards as a multiplier.
pub const MATCH_WEIGHTS: Weights = Weights {
    skills: 0.35,
    distance: 0.15,
    rating: 0.15,
    reliability: 0.15,
    availability: 0.10,
    past_performance: 0.10,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub skills: f64,
    pub distance: f64,
    pub rating: f64,
    pub reliability: f64,
    pub availability: f64,
    pub past_performance: f64,
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.skills
            + self.distance
            + self.rating
            + self.reliability
            + self.availability
            + self.past_performance
    }
}

impl Default for Weights {
    fn default() -> Self {
        MATCH_WEIGHTS
    }
}
