//! Equipment that needs periodic maintenance.
//!
//! A [`MaintenanceTarget`] grows staler every millisol until an agent
//! services it. Staleness is the quality metric used to rank targets for
//! worst-first selection. All mutation goes through one mutex per target.

use std::sync::Mutex;

use habitat_types::TargetId;
use tracing::info;

use crate::error::WorldError;
use crate::malfunction::{Malfunction, Malfunctionable, WearState};

/// A maintainable piece of equipment.
#[derive(Debug)]
pub struct MaintenanceTarget {
    /// Unique identifier.
    id: TargetId,
    /// Display name.
    name: String,
    /// Habitat zone.
    zone: u32,
    /// Wear and malfunction bookkeeping.
    wear: Mutex<WearState>,
}

impl MaintenanceTarget {
    /// Create new equipment that loses `wear_rate` percent condition per millisol.
    pub fn new(name: impl Into<String>, zone: u32, wear_rate: f64) -> Result<Self, WorldError> {
        let name = name.into();
        let wear = WearState::new(&name, wear_rate)?;
        Ok(Self {
            id: TargetId::new(),
            name,
            zone,
            wear: Mutex::new(wear),
        })
    }

    /// Target identifier.
    pub const fn id(&self) -> TargetId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Habitat zone.
    pub const fn zone(&self) -> u32 {
        self.zone
    }

    /// Millisols since the last completed maintenance.
    pub fn staleness(&self) -> f64 {
        let Ok(wear) = self.wear.lock() else {
            return 0.0;
        };
        wear.time_since_maintenance()
    }

    /// Condition in percent.
    pub fn wear_condition(&self) -> f64 {
        let Ok(wear) = self.wear.lock() else {
            return 0.0;
        };
        wear.wear_condition()
    }

    /// Let `time` millisols pass.
    pub fn age(&self, time: f64) {
        let Ok(mut wear) = self.wear.lock() else {
            return;
        };
        wear.age(time);
    }

    /// Apply `work` millisols of maintenance, returning the remaining staleness.
    pub fn service(&self, work: f64) -> f64 {
        let Ok(mut wear) = self.wear.lock() else {
            return 0.0;
        };
        wear.service(work)
    }
}

impl Malfunctionable for MaintenanceTarget {
    fn entity_name(&self) -> &str {
        &self.name
    }

    fn accident_modifier(&self) -> f64 {
        let Ok(wear) = self.wear.lock() else {
            return 1.0;
        };
        wear.accident_modifier()
    }

    fn has_malfunction(&self) -> bool {
        let Ok(wear) = self.wear.lock() else {
            return true;
        };
        wear.has_malfunction()
    }

    fn report_malfunction(&self, malfunction: Malfunction) {
        let Ok(mut wear) = self.wear.lock() else {
            return;
        };
        info!(
            equipment = %self.name,
            description = %malfunction.description,
            location = ?malfunction.location,
            "malfunction reported"
        );
        wear.add_malfunction(malfunction);
    }

    fn malfunction_count(&self) -> usize {
        let Ok(wear) = self.wear.lock() else {
            return 0;
        };
        wear.malfunctions().len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn staleness_grows_then_resets() {
        let target = MaintenanceTarget::new("Air Scrubber", 1, 0.02).unwrap();
        target.age(40.0);
        assert!((target.staleness() - 40.0).abs() < 1e-9);
        let left = target.service(4.0);
        assert!(left.abs() < f64::EPSILON);
        assert!(target.staleness().abs() < f64::EPSILON);
    }

    #[test]
    fn malfunctions_are_counted() {
        let target = MaintenanceTarget::new("Water Recycler", 2, 0.0).unwrap();
        assert!(!target.has_malfunction());
        target.report_malfunction(Malfunction {
            description: "pump seized".to_owned(),
            location: Some("Lab".to_owned()),
            reported_by: None,
            reported_at: None,
        });
        assert!(target.has_malfunction());
        assert_eq!(target.malfunction_count(), 1);
    }
}
