//! Error types for the habitat-tasks crate.
//!
//! Only configuration defects surface as [`TaskError`]. Everything that can
//! happen in a healthy simulation (no seat, unfit agent, accident, starved
//! computing lease) is absorbed into task state instead.

use habitat_world::WorldError;

/// A defect in a task configuration or in how the scheduler drives it.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// A phase was entered that the configuration never registered.
    #[error("task {task}: phase {phase} is not registered")]
    UnregisteredPhase {
        /// Task name.
        task: String,
        /// Name of the offending phase.
        phase: &'static str,
    },

    /// The task was advanced before an initial phase was set.
    #[error("task {task}: advanced with no phase set")]
    NoPhase {
        /// Task name.
        task: String,
    },

    /// The scheduler offered a negative or non-finite amount of time.
    #[error("task {task}: invalid time slice {time}")]
    InvalidTime {
        /// Task name.
        task: String,
        /// The rejected time.
        time: f64,
    },

    /// A duration budget was negative, zero, or non-finite.
    #[error("task {task}: invalid duration {duration}")]
    InvalidDuration {
        /// Task name.
        task: String,
        /// The rejected duration.
        duration: f64,
    },

    /// The duration budget was changed after phases began executing.
    #[error("task {task}: duration is fixed once phases have started")]
    DurationLocked {
        /// Task name.
        task: String,
    },

    /// A phase handler reported more time left than it was offered.
    #[error("task {task}: phase {phase} returned remainder {remaining} of {offered}")]
    InvalidRemainder {
        /// Task name.
        task: String,
        /// The phase that misbehaved.
        phase: &'static str,
        /// Time offered to the handler.
        offered: f64,
        /// Remainder it reported.
        remaining: f64,
    },

    /// Building a facility claim failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}
