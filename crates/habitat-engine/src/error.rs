//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode during startup and the tick
//! loop so that `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: habitat_core::config::ConfigError,
    },

    /// Clock initialization failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: habitat_core::clock::ClockError,
    },

    /// Settlement construction failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: habitat_world::WorldError,
    },

    /// A tick failed.
    #[error("scheduler error: {source}")]
    Scheduler {
        /// The underlying scheduler error.
        #[from]
        source: habitat_core::scheduler::SchedulerError,
    },

    /// Crew spawning failed.
    #[error("spawner error: {message}")]
    Spawner {
        /// Description of the spawner failure.
        message: String,
    },
}
