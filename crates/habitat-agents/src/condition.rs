//! Physical condition: fatigue, stress, soreness, hunger, thirst.
//!
//! Tasks mutate condition through the `add_*` methods; the scheduler ages it
//! once per tick through [`PhysicalCondition::time_passing`]. Non-finite
//! deltas are ignored and every gauge is clamped to its range, so callers
//! never need to validate.
//!
//! The performance rating in `[0, 1]` is derived from fatigue, stress and
//! soreness each tick. [`PhysicalCondition::set_performance_factor`]
//! overrides it until the next recomputation.

use serde::{Deserialize, Serialize};

use crate::config::ConditionConfig;

/// Upper bound of the stress and soreness gauges.
pub const MAX_GAUGE: f64 = 100.0;

/// An agent's physical and mental state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalCondition {
    /// Millisols of accumulated tiredness.
    fatigue: f64,
    /// Stress in `[0, 100]`.
    stress: f64,
    /// Muscle soreness in `[0, 100]`.
    muscle_soreness: f64,
    /// Millisols since last meal.
    hunger: f64,
    /// Millisols since last drink.
    thirst: f64,
    /// Work performance in `[0, 1]`.
    performance: f64,
}

impl Default for PhysicalCondition {
    fn default() -> Self {
        Self::new()
    }
}

/// Add `delta` to `value` and clamp into `[lo, hi]`, ignoring bad deltas.
fn bump(value: f64, delta: f64, lo: f64, hi: f64) -> f64 {
    if delta.is_finite() {
        (value + delta).clamp(lo, hi)
    } else {
        value
    }
}

impl PhysicalCondition {
    /// A rested, fed, unstressed agent.
    pub const fn new() -> Self {
        Self {
            fatigue: 0.0,
            stress: 0.0,
            muscle_soreness: 0.0,
            hunger: 0.0,
            thirst: 0.0,
            performance: 1.0,
        }
    }

    // --- Gauges ---------------------------------------------------------

    /// Fatigue in millisols.
    pub const fn fatigue(&self) -> f64 {
        self.fatigue
    }

    /// Stress in `[0, 100]`.
    pub const fn stress(&self) -> f64 {
        self.stress
    }

    /// Muscle soreness in `[0, 100]`.
    pub const fn muscle_soreness(&self) -> f64 {
        self.muscle_soreness
    }

    /// Hunger in millisols.
    pub const fn hunger(&self) -> f64 {
        self.hunger
    }

    /// Thirst in millisols.
    pub const fn thirst(&self) -> f64 {
        self.thirst
    }

    /// Performance rating in `[0, 1]`.
    pub const fn performance_rating(&self) -> f64 {
        self.performance
    }

    // --- Mutators -------------------------------------------------------

    /// Add fatigue (negative to recover).
    pub fn add_fatigue(&mut self, delta: f64) {
        self.fatigue = bump(self.fatigue, delta, 0.0, f64::MAX);
    }

    /// Add stress (negative to relax).
    pub fn add_stress(&mut self, delta: f64) {
        self.stress = bump(self.stress, delta, 0.0, MAX_GAUGE);
    }

    /// Add muscle soreness (negative to heal).
    pub fn add_muscle_soreness(&mut self, delta: f64) {
        self.muscle_soreness = bump(self.muscle_soreness, delta, 0.0, MAX_GAUGE);
    }

    /// Add hunger (negative after eating).
    pub fn add_hunger(&mut self, delta: f64) {
        self.hunger = bump(self.hunger, delta, 0.0, f64::MAX);
    }

    /// Add thirst (negative after drinking).
    pub fn add_thirst(&mut self, delta: f64) {
        self.thirst = bump(self.thirst, delta, 0.0, f64::MAX);
    }

    /// Override the performance rating.
    pub fn set_performance_factor(&mut self, value: f64) {
        if value.is_finite() {
            self.performance = value.clamp(0.0, 1.0);
        }
    }

    /// Let `time` millisols pass: hunger, thirst and fatigue rise, stress
    /// eases, and performance is recomputed.
    pub fn time_passing(&mut self, time: f64, config: &ConditionConfig) {
        if !time.is_finite() || time <= 0.0 {
            return;
        }
        self.add_hunger(config.hunger_rate * time);
        self.add_thirst(config.thirst_rate * time);
        self.add_fatigue(config.fatigue_rate * time);
        self.add_stress(-config.stress_recovery_rate * time);
        self.recompute_performance(config);
    }

    /// Overnight recovery: a meal, a drink, and a night's sleep.
    pub fn rest_and_refresh(&mut self, config: &ConditionConfig) {
        self.hunger = 0.0;
        self.thirst = 0.0;
        self.fatigue = 0.0;
        self.add_muscle_soreness(-MAX_GAUGE / 2.0);
        self.recompute_performance(config);
    }

    /// Derive performance from fatigue, stress and soreness.
    fn recompute_performance(&mut self, config: &ConditionConfig) {
        let fatigue_penalty = (self.fatigue / config.unfit_fatigue.max(1.0)).clamp(0.0, 1.0) * 0.5;
        let stress_penalty = (self.stress / MAX_GAUGE) * 0.3;
        let soreness_penalty = (self.muscle_soreness / MAX_GAUGE) * 0.2;
        self.performance = (1.0 - fatigue_penalty - stress_penalty - soreness_penalty).clamp(0.0, 1.0);
    }

    // --- Fitness queries ------------------------------------------------

    /// Hungry enough to want a meal.
    pub fn is_hungry(&self, config: &ConditionConfig) -> bool {
        self.hunger > config.hungry_threshold
    }

    /// Thirsty enough to want a drink.
    pub fn is_thirsty(&self, config: &ConditionConfig) -> bool {
        self.thirst > config.thirsty_threshold
    }

    /// Tired enough to want sleep.
    pub fn is_sleepy(&self, config: &ConditionConfig) -> bool {
        self.fatigue > config.sleepy_threshold
    }

    /// Stressed enough to be distracted.
    pub fn is_stressed(&self, config: &ConditionConfig) -> bool {
        self.stress > config.stressed_threshold
    }

    /// Hungry, thirsty and sleepy at once, or stressed.
    pub fn is_exhausted(&self, config: &ConditionConfig) -> bool {
        (self.is_hungry(config) && self.is_thirsty(config) && self.is_sleepy(config))
            || self.is_stressed(config)
    }

    /// In no state to do any work at all.
    pub fn is_super_unfit(&self, config: &ConditionConfig) -> bool {
        self.fatigue > config.unfit_fatigue
            || self.stress > config.unfit_stress
            || self.hunger > config.unfit_hunger
            || self.thirst > config.unfit_thirst
            || self.muscle_soreness > config.unfit_soreness
            || self.performance < config.unfit_performance
    }

    /// Comfortably fit for ordinary work.
    pub fn is_nominally_fit(&self, config: &ConditionConfig) -> bool {
        !self.is_super_unfit(config)
            && !self.is_exhausted(config)
            && !self.is_hungry(config)
            && !self.is_thirsty(config)
            && self.performance > 0.6
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_agent_is_fit() {
        let config = ConditionConfig::default();
        let condition = PhysicalCondition::new();
        assert!(condition.is_nominally_fit(&config));
        assert!(!condition.is_super_unfit(&config));
        assert!((condition.performance_rating() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn gauges_clamp() {
        let mut condition = PhysicalCondition::new();
        condition.add_stress(500.0);
        condition.add_muscle_soreness(-10.0);
        condition.add_fatigue(f64::NAN);
        assert!((condition.stress() - MAX_GAUGE).abs() < f64::EPSILON);
        assert!(condition.muscle_soreness().abs() < f64::EPSILON);
        assert!(condition.fatigue().abs() < f64::EPSILON);
    }

    #[test]
    fn high_stress_is_super_unfit() {
        let config = ConditionConfig::default();
        let mut condition = PhysicalCondition::new();
        condition.add_stress(95.0);
        assert!(condition.is_super_unfit(&config));
        assert!(condition.is_exhausted(&config));
    }

    #[test]
    fn exhaustion_needs_all_three_needs() {
        let config = ConditionConfig::default();
        let mut condition = PhysicalCondition::new();
        condition.add_hunger(700.0);
        condition.add_thirst(400.0);
        assert!(!condition.is_exhausted(&config));
        condition.add_fatigue(600.0);
        assert!(condition.is_exhausted(&config));
    }

    #[test]
    fn time_passing_degrades_performance_and_refresh_restores() {
        let config = ConditionConfig::default();
        let mut condition = PhysicalCondition::new();
        condition.time_passing(1000.0, &config);
        assert!(condition.performance_rating() < 1.0);
        assert!(condition.is_hungry(&config) || condition.hunger() > 0.0);
        condition.rest_and_refresh(&config);
        assert!(condition.fatigue().abs() < f64::EPSILON);
        assert!(condition.hunger().abs() < f64::EPSILON);
    }

    #[test]
    fn performance_override_clamps() {
        let mut condition = PhysicalCondition::new();
        condition.set_performance_factor(3.0);
        assert!((condition.performance_rating() - 1.0).abs() < f64::EPSILON);
        condition.set_performance_factor(0.0);
        assert!(condition.performance_rating().abs() < f64::EPSILON);
    }
}
