//! Settlement facilities and the contended-resource allocator.
//!
//! This crate models everything several agents may compete for at once:
//! seated stations with a fixed number of seats, equipment that wears out
//! and needs maintenance, computing nodes with a per-tick capacity, and
//! settlement-wide flags that only one agent may hold. Every shared counter
//! is guarded per resource instance (an atomic or a mutex), never per task.
//!
//! # Modules
//!
//! - [`computing`] -- Computing nodes, the node pool, and time-sliced
//!   computing leases.
//! - [`error`] -- Error types for facility construction.
//! - [`flag`] -- Settlement-wide exclusive flags held through leases.
//! - [`lease`] -- The [`Lease`] trait every scoped claim implements.
//! - [`maintenance`] -- Equipment that accumulates staleness until serviced.
//! - [`malfunction`] -- Wear tracking, malfunction records, and the
//!   [`Malfunctionable`] seam used by accident checks.
//! - [`selection`] -- Probability-weighted worst-candidate selection.
//! - [`settlement`] -- The resource directory tying all of the above together.
//! - [`station`] -- Bounded-capacity seat leasing.
//! - [`vehicle`] -- Vehicles and their garage state.
//!
//! [`Lease`]: lease::Lease
//! [`Malfunctionable`]: malfunction::Malfunctionable

pub mod computing;
pub mod error;
pub mod flag;
pub mod lease;
pub mod maintenance;
pub mod malfunction;
pub mod selection;
pub mod settlement;
pub mod station;
pub mod vehicle;

// Re-export primary types at crate root.
pub use computing::{ComputingLease, ComputingNode, ComputingPool, DrawReport};
pub use error::WorldError;
pub use flag::{FlagLease, SettlementFlag};
pub use lease::Lease;
pub use maintenance::MaintenanceTarget;
pub use malfunction::{Malfunction, Malfunctionable, WearState};
pub use selection::{DEFAULT_ANY_ZONE_PROBABILITY, SimRng, roll_any_zone, select_weighted, weighted_index};
pub use settlement::{Candidate, Settlement};
pub use station::{SeatLease, Station};
pub use vehicle::Vehicle;
