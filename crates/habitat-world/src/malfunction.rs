//! Wear, malfunctions, and the accident seam.
//!
//! Every piece of equipment an accident can be reported against carries a
//! [`WearState`]. Wear condition starts at 100% and drops as the equipment
//! ages; time since the last maintenance grows at the same time. Servicing
//! reverses both. Accidents scale with wear through
//! [`WearState::accident_modifier`].

use habitat_types::{AgentId, MarsTime};
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// Wear condition of brand-new equipment, in percent.
pub const FULL_CONDITION: f64 = 100.0;

/// Wear condition restored per millisol of maintenance work, in percent.
const CONDITION_PER_SERVICE_MILLISOL: f64 = 0.5;

/// Staleness removed per millisol of maintenance work.
const STALENESS_PER_SERVICE_MILLISOL: f64 = 10.0;

/// A malfunction reported against a piece of equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Malfunction {
    /// What went wrong.
    pub description: String,
    /// Where it happened, if known (room, site name).
    pub location: Option<String>,
    /// The agent whose accident caused it.
    pub reported_by: Option<AgentId>,
    /// When it was reported.
    pub reported_at: Option<MarsTime>,
}

/// Anything an accident can be reported against.
pub trait Malfunctionable: Send + Sync {
    /// Display name of the entity.
    fn entity_name(&self) -> &str;

    /// Multiplier applied to accident probability, in `[1, 2]`.
    fn accident_modifier(&self) -> f64;

    /// Whether the entity currently has an unrepaired malfunction.
    fn has_malfunction(&self) -> bool;

    /// Record a new malfunction against the entity.
    fn report_malfunction(&self, malfunction: Malfunction);

    /// Number of unrepaired malfunctions.
    fn malfunction_count(&self) -> usize;
}

/// Mutable wear and malfunction bookkeeping for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WearState {
    /// Condition in percent, 100 = new.
    wear_condition: f64,
    /// Millisols since the last completed maintenance.
    time_since_maintenance: f64,
    /// Condition lost per millisol of aging.
    wear_rate: f64,
    /// Unrepaired malfunctions.
    malfunctions: Vec<Malfunction>,
}

impl WearState {
    /// Create the wear state of new equipment.
    pub fn new(name: &str, wear_rate: f64) -> Result<Self, WorldError> {
        if !wear_rate.is_finite() || wear_rate < 0.0 {
            return Err(WorldError::InvalidWearRate {
                name: name.to_owned(),
                value: wear_rate,
            });
        }
        Ok(Self {
            wear_condition: FULL_CONDITION,
            time_since_maintenance: 0.0,
            wear_rate,
            malfunctions: Vec::new(),
        })
    }

    /// Current condition in percent.
    pub const fn wear_condition(&self) -> f64 {
        self.wear_condition
    }

    /// Millisols since the last completed maintenance.
    pub const fn time_since_maintenance(&self) -> f64 {
        self.time_since_maintenance
    }

    /// Unrepaired malfunctions.
    pub fn malfunctions(&self) -> &[Malfunction] {
        &self.malfunctions
    }

    /// Let `time` millisols pass without maintenance.
    pub fn age(&mut self, time: f64) {
        if !time.is_finite() || time <= 0.0 {
            return;
        }
        self.time_since_maintenance += time;
        self.wear_condition = (self.wear_condition - self.wear_rate * time).max(0.0);
    }

    /// Apply `work` millisols of maintenance.
    ///
    /// Staleness drops and condition recovers. Once staleness reaches zero
    /// the maintenance is complete and outstanding malfunctions are cleared.
    /// Returns the remaining staleness.
    pub fn service(&mut self, work: f64) -> f64 {
        if !work.is_finite() || work <= 0.0 {
            return self.time_since_maintenance;
        }
        self.time_since_maintenance =
            (self.time_since_maintenance - work * STALENESS_PER_SERVICE_MILLISOL).max(0.0);
        self.wear_condition =
            (self.wear_condition + work * CONDITION_PER_SERVICE_MILLISOL).min(FULL_CONDITION);
        if self.time_since_maintenance <= 0.0 {
            self.malfunctions.clear();
        }
        self.time_since_maintenance
    }

    /// Accident multiplier: 1 for new equipment, rising to 2 when fully worn.
    pub fn accident_modifier(&self) -> f64 {
        1.0 + (FULL_CONDITION - self.wear_condition).clamp(0.0, FULL_CONDITION) / FULL_CONDITION
    }

    /// Record a malfunction.
    pub fn add_malfunction(&mut self, malfunction: Malfunction) {
        self.malfunctions.push(malfunction);
    }

    /// Whether any malfunction is outstanding.
    pub fn has_malfunction(&self) -> bool {
        !self.malfunctions.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Malfunction {
        Malfunction {
            description: "seal failure".to_owned(),
            location: None,
            reported_by: None,
            reported_at: None,
        }
    }

    #[test]
    fn new_equipment_has_baseline_modifier() {
        let wear = WearState::new("pump", 0.01).unwrap();
        assert!((wear.accident_modifier() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn aging_lowers_condition_and_raises_staleness() {
        let mut wear = WearState::new("pump", 0.1).unwrap();
        wear.age(100.0);
        assert!((wear.wear_condition() - 90.0).abs() < 1e-9);
        assert!((wear.time_since_maintenance() - 100.0).abs() < 1e-9);
        assert!((wear.accident_modifier() - 1.1).abs() < 1e-9);
    }

    #[test]
    fn condition_never_drops_below_zero() {
        let mut wear = WearState::new("pump", 1.0).unwrap();
        wear.age(500.0);
        assert!(wear.wear_condition().abs() < f64::EPSILON);
        assert!((wear.accident_modifier() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn full_service_clears_malfunctions() {
        let mut wear = WearState::new("pump", 0.0).unwrap();
        wear.age(50.0);
        wear.add_malfunction(sample());
        let left = wear.service(2.0);
        assert!((left - 30.0).abs() < 1e-9);
        assert!(wear.has_malfunction());
        let left = wear.service(10.0);
        assert!(left.abs() < f64::EPSILON);
        assert!(!wear.has_malfunction());
    }

    #[test]
    fn rejects_negative_wear_rate() {
        assert!(WearState::new("pump", -1.0).is_err());
        assert!(WearState::new("pump", f64::NAN).is_err());
    }
}
