//! Error types for the `habitat-world` crate.
//!
//! Facility construction validates its inputs and reports problems through
//! [`WorldError`]. Runtime contention (a full station, an exhausted node) is
//! never an error: it is expressed as `None` or a partial draw.

/// Errors that can occur while building or configuring settlement facilities.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A station was declared with zero seats.
    #[error("station {name} must have at least one seat")]
    InvalidCapacity {
        /// Name of the offending station.
        name: String,
    },

    /// A computing node was declared with a negative or non-finite capacity.
    #[error("computing node {name} has invalid capacity {value}")]
    InvalidComputingCapacity {
        /// Name of the offending node.
        name: String,
        /// The rejected capacity.
        value: f64,
    },

    /// A computing lease was requested with a negative or non-finite amount.
    #[error("invalid computing lease amount {value}")]
    InvalidLeaseAmount {
        /// The rejected amount.
        value: f64,
    },

    /// A wear rate was negative or non-finite.
    #[error("invalid wear rate {value} for {name}")]
    InvalidWearRate {
        /// Name of the offending entity.
        name: String,
        /// The rejected rate.
        value: f64,
    },

    /// A flag with the same name already exists in the settlement.
    #[error("duplicate settlement flag: {0}")]
    DuplicateFlag(String),
}
