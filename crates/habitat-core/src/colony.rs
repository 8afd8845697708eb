//! The colony: clock, settlement and sky, as seen by running tasks.
//!
//! [`Colony`] is the production [`TaskEnvironment`]. It owns the
//! [`MarsClock`] and the [`Settlement`], ages every facility once per tick,
//! and derives surface conditions from a simple diurnal model: the sun
//! rises at millisol 250, peaks at 500 and sets at 750.

use std::f64::consts::PI;

use habitat_tasks::{OutdoorConditions, TaskConfig, TaskEnvironment};
use habitat_types::MarsTime;
use habitat_world::{ComputingNode, MaintenanceTarget, Settlement, Station, Vehicle, WorldError};
use tracing::debug;

use crate::clock::{ClockError, ClockPulse, MarsClock};
use crate::config::SettlementConfig;

/// Millisol of sunrise.
pub const SUNRISE: f64 = 250.0;

/// Millisol of sunset.
pub const SUNSET: f64 = 750.0;

/// Millisols before sunset when it counts as getting dark.
const DUSK_WINDOW: f64 = 50.0;

/// Build a settlement from its configuration.
pub fn build_settlement(config: &SettlementConfig) -> Result<Settlement, WorldError> {
    let mut settlement = Settlement::new(config.name.clone());
    for station in &config.stations {
        settlement.add_station(Station::new(
            station.name.clone(),
            station.function,
            station.zone,
            station.capacity,
        )?);
    }
    for target in &config.maintenance_targets {
        settlement.add_target(MaintenanceTarget::new(target.name.clone(), target.zone, target.wear_rate)?);
    }
    for node in &config.computing_nodes {
        settlement.add_node(ComputingNode::new(node.name.clone(), node.zone, node.peak_per_millisol)?);
    }
    for vehicle in &config.vehicles {
        settlement.add_vehicle(Vehicle::new(vehicle.name.clone(), vehicle.garaged));
    }
    for flag in &config.flags {
        settlement.add_flag(flag.clone())?;
    }
    debug!(
        settlement = %settlement.name(),
        stations = settlement.stations().len(),
        targets = settlement.targets().len(),
        nodes = settlement.computing().nodes().len(),
        "settlement built"
    );
    Ok(settlement)
}

/// Solar irradiance at `time`, as a fraction of the midday peak.
pub fn solar_irradiance(time: MarsTime) -> f64 {
    if !time.is_within(SUNRISE, SUNSET) {
        return 0.0;
    }
    (PI * (time.millisol - SUNRISE) / (SUNSET - SUNRISE)).sin().max(0.0)
}

/// The running colony.
#[derive(Debug)]
pub struct Colony {
    /// Simulated time.
    clock: MarsClock,
    /// Facilities.
    settlement: Settlement,
    /// Task tunables.
    tasks: TaskConfig,
    /// Whether a solar particle event is under way.
    radiation_alert: bool,
}

impl Colony {
    /// Assemble a colony.
    pub const fn new(clock: MarsClock, settlement: Settlement, tasks: TaskConfig) -> Self {
        Self {
            clock,
            settlement,
            tasks,
            radiation_alert: false,
        }
    }

    /// Advance the clock by `pulse` millisols and age every facility.
    pub fn advance(&mut self, pulse: f64) -> Result<ClockPulse, ClockError> {
        let step = self.clock.advance(pulse)?;
        self.settlement.age(step.elapsed);
        Ok(step)
    }

    /// The clock.
    pub const fn clock(&self) -> &MarsClock {
        &self.clock
    }

    /// Mutable settlement access for setup.
    pub const fn settlement_mut(&mut self) -> &mut Settlement {
        &mut self.settlement
    }

    /// Raise or clear the radiation alert.
    pub const fn set_radiation_alert(&mut self, alert: bool) {
        self.radiation_alert = alert;
    }
}

impl TaskEnvironment for Colony {
    fn current_time(&self) -> MarsTime {
        self.clock.current_time()
    }

    fn millisol_of(&self, time: MarsTime) -> u32 {
        MarsClock::millisol_of(time)
    }

    fn settlement(&self) -> &Settlement {
        &self.settlement
    }

    fn outdoor_conditions(&self) -> OutdoorConditions {
        let now = self.current_time();
        OutdoorConditions {
            solar_irradiance: solar_irradiance(now),
            getting_dark: now.is_within(SUNSET - DUSK_WINDOW, SUNSET),
            radiation_alert: self.radiation_alert,
        }
    }

    fn config(&self) -> &TaskConfig {
        &self.tasks
    }
}
