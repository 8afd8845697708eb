//! Colonist state for the Habitat task engine.
//!
//! Tasks read and mutate agents through this crate: fitness queries,
//! attribute and skill lookups, and physical-state mutators. Nothing here
//! knows about tasks; the dependency runs the other way.
//!
//! # Modules
//!
//! - [`agent`] -- The [`Agent`] aggregate and its [`AgentLocation`]
//! - [`attributes`] -- Natural attributes in `[0, 100]`
//! - [`condition`] -- Fatigue, stress, soreness, hunger, thirst, performance
//! - [`config`] -- Fitness thresholds and per-millisol rates ([`ConditionConfig`])
//! - [`error`] -- Error types for agent operations ([`AgentError`])
//! - [`skills`] -- Skill levels and experience ([`SkillManager`])
//! - [`suit`] -- EVA suit consumables and fault checks
//!
//! [`Agent`]: agent::Agent
//! [`AgentLocation`]: agent::AgentLocation
//! [`ConditionConfig`]: config::ConditionConfig
//! [`AgentError`]: error::AgentError
//! [`SkillManager`]: skills::SkillManager

pub mod agent;
pub mod attributes;
pub mod condition;
pub mod config;
pub mod error;
pub mod skills;
pub mod suit;

pub use agent::{Agent, AgentLocation};
pub use attributes::NaturalAttributes;
pub use condition::PhysicalCondition;
pub use config::ConditionConfig;
pub use error::AgentError;
pub use skills::SkillManager;
pub use suit::{EvaSuit, SuitProblem};
