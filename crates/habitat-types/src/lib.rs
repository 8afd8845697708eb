//! Shared type definitions for the Habitat task engine.
//!
//! This crate is the single source of truth for the vocabulary shared by
//! the agent model, the resource directory, and the task engine.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Enumeration types (skills, attributes, facility functions, load classes)
//! - [`time`] -- Mars calendar timestamp expressed in sols and millisols

pub mod enums;
pub mod ids;
pub mod time;

// Re-export all public types at crate root for convenience.
pub use enums::{FunctionType, LoadClass, NaturalAttribute, PhysicalEffort, ResourceKind, SkillType};
pub use ids::{AgentId, NodeId, StationId, TargetId, TaskId, VehicleId};
pub use time::{MILLISOLS_PER_SOL, MarsTime};
