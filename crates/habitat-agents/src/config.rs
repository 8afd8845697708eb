//! Fitness thresholds and physiological rates.
//!
//! The [`ConditionConfig`] struct bundles every tunable used by
//! [`PhysicalCondition`](crate::condition::PhysicalCondition) so that
//! callers (scheduler, tests) can override defaults. Rates are per millisol.

use serde::{Deserialize, Serialize};

/// Thresholds and rates for agent physical condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionConfig {
    /// Hunger gained per millisol (default: 0.25).
    pub hunger_rate: f64,
    /// Thirst gained per millisol (default: 0.3).
    pub thirst_rate: f64,
    /// Fatigue gained per millisol awake (default: 0.2).
    pub fatigue_rate: f64,
    /// Stress shed per millisol when nothing adds to it (default: 0.01).
    pub stress_recovery_rate: f64,

    /// Hunger above which the agent is hungry (default: 600).
    pub hungry_threshold: f64,
    /// Thirst above which the agent is thirsty (default: 300).
    pub thirsty_threshold: f64,
    /// Fatigue above which the agent is sleepy (default: 500).
    pub sleepy_threshold: f64,
    /// Stress above which the agent is stressed (default: 60).
    pub stressed_threshold: f64,

    /// Fatigue above which the agent is super unfit (default: 1000).
    pub unfit_fatigue: f64,
    /// Stress above which the agent is super unfit (default: 90).
    pub unfit_stress: f64,
    /// Hunger above which the agent is super unfit (default: 2000).
    pub unfit_hunger: f64,
    /// Thirst above which the agent is super unfit (default: 1000).
    pub unfit_thirst: f64,
    /// Muscle soreness above which the agent is super unfit (default: 90).
    pub unfit_soreness: f64,
    /// Performance below which the agent is super unfit (default: 0.1).
    pub unfit_performance: f64,
}

impl Default for ConditionConfig {
    fn default() -> Self {
        Self {
            hunger_rate: 0.25,
            thirst_rate: 0.3,
            fatigue_rate: 0.2,
            stress_recovery_rate: 0.01,
            hungry_threshold: 600.0,
            thirsty_threshold: 300.0,
            sleepy_threshold: 500.0,
            stressed_threshold: 60.0,
            unfit_fatigue: 1000.0,
            unfit_stress: 90.0,
            unfit_hunger: 2000.0,
            unfit_thirst: 1000.0,
            unfit_soreness: 90.0,
            unfit_performance: 0.1,
        }
    }
}
