use serde::{Deserialize, Serialize};

/// Constants shaping the skill penalty and the bonus ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Cap growth per unit of required-skill coverage when coverage is incomplete.
    pub penalty_scale: f64,
    /// Cap applied when no required skill is met.
    pub penalty_floor: f64,
    pub max_bonus: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            penalty_scale: 50.0,
            penalty_floor: 25.0,
            max_bonus: 15.0,
        }
    }
}
