//! Bounded-capacity seat leasing.
//!
//! A [`Station`] has a fixed number of seats. Agents try it with
//! [`Station::try_acquire`]: the check-and-increment is a single
//! compare-and-swap on the holder counter, so concurrent attempts from
//! different threads can never push the count past capacity. There is no
//! queue and no waiting; a full station simply returns `None`.
//!
//! The returned [`SeatLease`] gives the seat back exactly once, either
//! through [`Lease::release`] or when it is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use habitat_types::{AgentId, FunctionType, StationId};
use tracing::debug;

use crate::error::WorldError;
use crate::lease::Lease;

/// A seated work station (office desk, lab bench, dining table).
#[derive(Debug)]
pub struct Station {
    /// Unique identifier.
    id: StationId,
    /// Display name.
    name: String,
    /// The function this station provides.
    function: FunctionType,
    /// Habitat zone the station is in.
    zone: u32,
    /// Maximum simultaneous occupants.
    capacity: u32,
    /// Current occupants. Always in `[0, capacity]`.
    holders: AtomicU32,
}

impl Station {
    /// Create an empty station.
    pub fn new(
        name: impl Into<String>,
        function: FunctionType,
        zone: u32,
        capacity: u32,
    ) -> Result<Self, WorldError> {
        let name = name.into();
        if capacity == 0 {
            return Err(WorldError::InvalidCapacity { name });
        }
        Ok(Self {
            id: StationId::new(),
            name,
            function,
            zone,
            capacity,
            holders: AtomicU32::new(0),
        })
    }

    /// Station identifier.
    pub const fn id(&self) -> StationId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Function provided.
    pub const fn function(&self) -> FunctionType {
        self.function
    }

    /// Habitat zone.
    pub const fn zone(&self) -> u32 {
        self.zone
    }

    /// Seat count.
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Seats currently taken.
    pub fn current_holders(&self) -> u32 {
        self.holders.load(Ordering::Acquire)
    }

    /// Whether at least one seat is free at this instant.
    pub fn has_free_seat(&self) -> bool {
        self.current_holders() < self.capacity
    }

    /// Try to take a seat for `holder`.
    ///
    /// Succeeds iff a seat is free at the instant of the attempt.
    pub fn try_acquire(self: &Arc<Self>, holder: AgentId) -> Option<SeatLease> {
        let capacity = self.capacity;
        let taken = self
            .holders
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if current < capacity {
                    current.checked_add(1)
                } else {
                    None
                }
            })
            .is_ok();

        if !taken {
            debug!(station = %self.name, agent = %holder, "station full");
            return None;
        }

        debug!(
            station = %self.name,
            agent = %holder,
            holders = self.current_holders(),
            capacity,
            "seat acquired"
        );
        Some(SeatLease {
            station: Arc::clone(self),
            holder,
            released: false,
        })
    }

    /// Give back one seat, flooring the counter at zero.
    fn vacate(&self) -> bool {
        self.holders
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current.checked_sub(1)
            })
            .is_ok()
    }
}

/// One occupied seat at a [`Station`].
#[derive(Debug)]
pub struct SeatLease {
    /// The station the seat belongs to.
    station: Arc<Station>,
    /// The agent sitting there.
    holder: AgentId,
    /// Set once the seat has been given back.
    released: bool,
}

impl SeatLease {
    /// The leased station.
    pub fn station(&self) -> &Arc<Station> {
        &self.station
    }

    /// The agent holding the seat.
    pub const fn holder(&self) -> AgentId {
        self.holder
    }
}

impl Lease for SeatLease {
    fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;
        self.station.vacate();
        debug!(
            station = %self.station.name,
            agent = %self.holder,
            holders = self.station.current_holders(),
            "seat released"
        );
        true
    }

    fn is_released(&self) -> bool {
        self.released
    }

    fn label(&self) -> String {
        format!("seat at {}", self.station.name)
    }
}

impl Drop for SeatLease {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn office(capacity: u32) -> Arc<Station> {
        Arc::new(Station::new("Admin Office", FunctionType::Administration, 1, capacity).unwrap())
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(Station::new("Broom Closet", FunctionType::Administration, 1, 0).is_err());
    }

    #[test]
    fn acquire_until_full() {
        let station = office(2);
        let first = station.try_acquire(AgentId::new());
        let second = station.try_acquire(AgentId::new());
        let third = station.try_acquire(AgentId::new());
        assert!(first.is_some());
        assert!(second.is_some());
        assert!(third.is_none());
        assert_eq!(station.current_holders(), 2);
    }

    #[test]
    fn double_release_is_harmless() {
        let station = office(1);
        let mut lease = station.try_acquire(AgentId::new()).unwrap();
        assert!(lease.release());
        assert!(!lease.release());
        assert!(lease.is_released());
        assert_eq!(station.current_holders(), 0);
        drop(lease);
        assert_eq!(station.current_holders(), 0);
    }

    #[test]
    fn drop_returns_the_seat() {
        let station = office(1);
        {
            let _lease = station.try_acquire(AgentId::new()).unwrap();
            assert!(!station.has_free_seat());
        }
        assert!(station.has_free_seat());
    }

    #[test]
    fn vacate_floors_at_zero() {
        let station = office(1);
        assert!(!station.vacate());
        assert_eq!(station.current_holders(), 0);
    }
}
