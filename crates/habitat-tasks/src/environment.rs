//! What a running task can see of the world around it.
//!
//! The scheduler owns the clock and the settlement and lends them to tasks
//! through [`TaskEnvironment`]. [`FixedEnvironment`] is a simple
//! implementation with a frozen clock and sky, used by tests and tools.

use habitat_types::MarsTime;
use habitat_world::Settlement;
use serde::{Deserialize, Serialize};

use crate::config::TaskConfig;

/// Surface conditions relevant to outdoor work.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutdoorConditions {
    /// Solar irradiance as a fraction of the maximum, in `[0, 1]`.
    pub solar_irradiance: f64,
    /// Whether dusk is approaching.
    pub getting_dark: bool,
    /// Whether a solar particle event is under way.
    pub radiation_alert: bool,
}

impl OutdoorConditions {
    /// A clear midday sky.
    pub const fn daylight() -> Self {
        Self {
            solar_irradiance: 1.0,
            getting_dark: false,
            radiation_alert: false,
        }
    }
}

/// Services a task consumes while it runs.
pub trait TaskEnvironment {
    /// Current simulated time.
    fn current_time(&self) -> MarsTime;

    /// Whole millisol of `time` within its sol.
    fn millisol_of(&self, time: MarsTime) -> u32 {
        time.millisol_int()
    }

    /// The resource directory.
    fn settlement(&self) -> &Settlement;

    /// Current surface conditions.
    fn outdoor_conditions(&self) -> OutdoorConditions;

    /// Task tunables.
    fn config(&self) -> &TaskConfig;
}

/// A [`TaskEnvironment`] with a frozen clock and sky.
#[derive(Debug)]
pub struct FixedEnvironment {
    /// The settlement.
    pub settlement: Settlement,
    /// Reported time.
    pub time: MarsTime,
    /// Reported surface conditions.
    pub outdoor: OutdoorConditions,
    /// Task tunables.
    pub config: TaskConfig,
}

impl FixedEnvironment {
    /// Midday on sol 1 with default tunables.
    pub fn new(settlement: Settlement) -> Self {
        Self {
            settlement,
            time: MarsTime::new(1, 500.0),
            outdoor: OutdoorConditions::daylight(),
            config: TaskConfig::default(),
        }
    }
}

impl TaskEnvironment for FixedEnvironment {
    fn current_time(&self) -> MarsTime {
        self.time
    }

    fn settlement(&self) -> &Settlement {
        &self.settlement
    }

    fn outdoor_conditions(&self) -> OutdoorConditions {
        self.outdoor
    }

    fn config(&self) -> &TaskConfig {
        &self.config
    }
}
