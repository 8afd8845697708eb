//! Runtime tunables read by tasks through the environment.

use habitat_agents::ConditionConfig;
use habitat_world::DEFAULT_ANY_ZONE_PROBABILITY;
use serde::{Deserialize, Serialize};

/// Tunables shared by every task configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    /// Base accident chance per millisol for indoor work (default: 0.001).
    pub accident_base_chance: f64,
    /// Base accident chance per millisol outside, against the suit (default: 0.01).
    pub eva_accident_chance: f64,
    /// Chance that worst-first selection widens to every zone (default: 0.05).
    pub any_zone_probability: f64,
    /// Millisols of work per experience point before modifiers (default: 20).
    pub experience_ratio: f64,
    /// Solar irradiance, as a fraction of the maximum, at or below which
    /// outdoor work stops (default: 0.01).
    pub eva_min_sunlight: f64,
    /// Millisols to suit up, cycle the airlock and walk to a site (default: 20).
    pub eva_egress_time: f64,
    /// Consecutive ticks with no computing capacity before a computing task
    /// gives up (default: 10).
    pub max_starved_ticks: u32,
    /// Fitness thresholds.
    pub condition: ConditionConfig,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            accident_base_chance: 0.001,
            eva_accident_chance: 0.01,
            any_zone_probability: DEFAULT_ANY_ZONE_PROBABILITY,
            experience_ratio: 20.0,
            eva_min_sunlight: 0.01,
            eva_egress_time: 20.0,
            max_starved_ticks: 10,
            condition: ConditionConfig::default(),
        }
    }
}
