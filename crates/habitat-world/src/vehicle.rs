//! Vehicles parked in or around the settlement.

use std::sync::atomic::{AtomicBool, Ordering};

use habitat_types::VehicleId;

/// A vehicle that may be parked inside a garage.
#[derive(Debug)]
pub struct Vehicle {
    /// Unique identifier.
    id: VehicleId,
    /// Display name.
    name: String,
    /// Whether the vehicle is currently inside a garage.
    garaged: AtomicBool,
}

impl Vehicle {
    /// Create a vehicle.
    pub fn new(name: impl Into<String>, garaged: bool) -> Self {
        Self {
            id: VehicleId::new(),
            name: name.into(),
            garaged: AtomicBool::new(garaged),
        }
    }

    /// Vehicle identifier.
    pub const fn id(&self) -> VehicleId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the vehicle is inside a garage.
    pub fn is_garaged(&self) -> bool {
        self.garaged.load(Ordering::Acquire)
    }

    /// Move the vehicle in or out of the garage.
    pub fn set_garaged(&self, garaged: bool) {
        self.garaged.store(garaged, Ordering::Release);
    }
}
