//! EVA suits.
//!
//! A suit pairs consumables (oxygen, water) with the equipment record that
//! accidents are reported against. Oxygen drains while the wearer is
//! outside and is topped up when they return.

use std::sync::Arc;

use habitat_world::{MaintenanceTarget, Malfunctionable};
use serde::{Deserialize, Serialize};

/// Oxygen fraction at or below which the suit is unsafe.
pub const LOW_OXYGEN: f64 = 0.2;

/// Water fraction at or below which the wearer is warned.
pub const LOW_WATER: f64 = 0.1;

/// Oxygen fraction used per millisol outside.
const OXYGEN_PER_MILLISOL: f64 = 0.0008;

/// Water fraction used per millisol outside.
const WATER_PER_MILLISOL: f64 = 0.0005;

/// A fault that makes the suit unsafe to wear outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuitProblem {
    /// Oxygen at or below [`LOW_OXYGEN`].
    LowOxygen,
    /// Life support has failed.
    LifeSupportFailure,
    /// The suit has an unrepaired malfunction.
    Malfunction,
}

impl core::fmt::Display for SuitProblem {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::LowOxygen => write!(f, "suit oxygen low"),
            Self::LifeSupportFailure => write!(f, "suit life support failed"),
            Self::Malfunction => write!(f, "suit malfunction"),
        }
    }
}

/// An EVA suit assigned to one agent.
#[derive(Debug, Clone)]
pub struct EvaSuit {
    /// Equipment record for wear and malfunctions.
    equipment: Arc<MaintenanceTarget>,
    /// Oxygen remaining, as a fraction of a full tank.
    oxygen: f64,
    /// Water remaining, as a fraction of a full bladder.
    water: f64,
    /// Whether life support is working.
    life_support_ok: bool,
}

impl EvaSuit {
    /// A fully charged suit backed by `equipment`.
    pub const fn new(equipment: Arc<MaintenanceTarget>) -> Self {
        Self {
            equipment,
            oxygen: 1.0,
            water: 1.0,
            life_support_ok: true,
        }
    }

    /// Equipment record.
    pub const fn equipment(&self) -> &Arc<MaintenanceTarget> {
        &self.equipment
    }

    /// Oxygen fraction.
    pub const fn oxygen(&self) -> f64 {
        self.oxygen
    }

    /// Water fraction.
    pub const fn water(&self) -> f64 {
        self.water
    }

    /// Mark life support as failed or restored.
    pub const fn set_life_support(&mut self, ok: bool) {
        self.life_support_ok = ok;
    }

    /// Set the oxygen fraction directly (clamped to `[0, 1]`).
    pub fn set_oxygen(&mut self, fraction: f64) {
        if fraction.is_finite() {
            self.oxygen = fraction.clamp(0.0, 1.0);
        }
    }

    /// Consume consumables for `time` millisols outside.
    pub fn consume(&mut self, time: f64) {
        if !time.is_finite() || time <= 0.0 {
            return;
        }
        self.oxygen = (self.oxygen - OXYGEN_PER_MILLISOL * time).max(0.0);
        self.water = (self.water - WATER_PER_MILLISOL * time).max(0.0);
    }

    /// Refill oxygen and water.
    pub const fn recharge(&mut self) {
        self.oxygen = 1.0;
        self.water = 1.0;
    }

    /// The first fault that makes the suit unsafe, if any.
    pub fn problem(&self) -> Option<SuitProblem> {
        if self.oxygen <= LOW_OXYGEN {
            Some(SuitProblem::LowOxygen)
        } else if !self.life_support_ok {
            Some(SuitProblem::LifeSupportFailure)
        } else if self.equipment.has_malfunction() {
            Some(SuitProblem::Malfunction)
        } else {
            None
        }
    }

    /// Whether water is low enough to warn about.
    pub fn is_water_low(&self) -> bool {
        self.water <= LOW_WATER
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use habitat_world::Malfunction;

    use super::*;

    fn suit() -> EvaSuit {
        EvaSuit::new(Arc::new(MaintenanceTarget::new("Suit 1", 0, 0.0).unwrap()))
    }

    #[test]
    fn fresh_suit_has_no_problem() {
        assert_eq!(suit().problem(), None);
    }

    #[test]
    fn oxygen_drains_to_a_problem() {
        let mut suit = suit();
        suit.consume(1_000.0);
        assert_eq!(suit.problem(), Some(SuitProblem::LowOxygen));
        suit.recharge();
        assert_eq!(suit.problem(), None);
    }

    #[test]
    fn malfunction_and_life_support() {
        let mut suit = suit();
        suit.set_life_support(false);
        assert_eq!(suit.problem(), Some(SuitProblem::LifeSupportFailure));
        suit.set_life_support(true);
        suit.equipment().report_malfunction(Malfunction {
            description: "visor crack".to_owned(),
            location: None,
            reported_by: None,
            reported_at: None,
        });
        assert_eq!(suit.problem(), Some(SuitProblem::Malfunction));
    }
}
