//! Phase-driven task engine for the Habitat simulation.
//!
//! A task is a small state machine: a set of registered phases, one handler
//! per phase, a duration budget and the bookkeeping around it. The
//! scheduler offers each agent's task a slice of simulated time per tick;
//! the engine dispatches one handler per call and hands back whatever time
//! the handler did not use.
//!
//! # Modules
//!
//! - [`activities`] -- Concrete task configurations and [`ActivityKind`]
//! - [`config`] -- Runtime tunables ([`TaskConfig`])
//! - [`context`] -- What a phase handler can touch ([`TaskContext`])
//! - [`engine`] -- [`Task`], [`TaskBehavior`] and the dispatch loop
//! - [`environment`] -- The world as seen by tasks ([`TaskEnvironment`])
//! - [`error`] -- Configuration defects ([`TaskError`])
//! - [`eva`] -- The outdoor protocol ([`EvaOperation`], [`OutsideActivity`])
//! - [`experience`] -- Skill and effort descriptors ([`ExperienceImpact`])
//! - [`phase`] -- Phases, outcomes and the phase table
//! - [`runnable`] -- Object-safe task handle for the scheduler ([`Runnable`])
//! - [`task`] -- Engine-owned per-task state ([`TaskCore`])
//!
//! [`ActivityKind`]: activities::ActivityKind
//! [`TaskConfig`]: config::TaskConfig
//! [`TaskContext`]: context::TaskContext
//! [`Task`]: engine::Task
//! [`TaskBehavior`]: engine::TaskBehavior
//! [`TaskEnvironment`]: environment::TaskEnvironment
//! [`TaskError`]: error::TaskError
//! [`EvaOperation`]: eva::EvaOperation
//! [`OutsideActivity`]: eva::OutsideActivity
//! [`ExperienceImpact`]: experience::ExperienceImpact
//! [`Runnable`]: runnable::Runnable
//! [`TaskCore`]: task::TaskCore

pub mod activities;
pub mod config;
pub mod context;
pub mod engine;
pub mod environment;
pub mod error;
pub mod eva;
pub mod experience;
pub mod phase;
pub mod runnable;
pub mod task;

pub use activities::ActivityKind;
pub use config::TaskConfig;
pub use context::TaskContext;
pub use engine::{TIME_TOLERANCE, Task, TaskBehavior};
pub use environment::{FixedEnvironment, OutdoorConditions, TaskEnvironment};
pub use error::TaskError;
pub use eva::{AbortReason, EvaOperation, EvaPhase, OutsideActivity, OutsideSite, Readiness};
pub use experience::ExperienceImpact;
pub use habitat_world::SimRng;
pub use phase::{Phase, PhaseHandler, PhaseOutcome, PhaseTable};
pub use runnable::Runnable;
pub use task::TaskCore;
