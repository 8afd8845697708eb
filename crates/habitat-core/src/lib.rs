//! Mars clock, colony environment, and tick orchestration for the Habitat
//! simulation.
//!
//! This crate ties the lower layers together: it owns simulated time, builds
//! the settlement from configuration, and runs the per-tick loop that hands
//! each agent's task its slice of time.
//!
//! # Modules
//!
//! - [`clock`] -- Mars clock with tick counter, sol rollover and Earth time.
//! - [`colony`] -- [`Colony`], the production task environment.
//! - [`config`] -- Configuration loading from `habitat-config.yaml` into
//!   strongly-typed structs.
//! - [`scheduler`] -- [`TaskScheduler`] and the per-tick dispatch loop.
//! - [`selector`] -- [`BehaviorSelector`] trait and
//!   [`WeightedActivitySelector`].
//!
//! [`Colony`]: colony::Colony
//! [`TaskScheduler`]: scheduler::TaskScheduler
//! [`BehaviorSelector`]: selector::BehaviorSelector
//! [`WeightedActivitySelector`]: selector::WeightedActivitySelector

pub mod clock;
pub mod colony;
pub mod config;
pub mod scheduler;
pub mod selector;
