//! Simulation binary for the Habitat colony.
//!
//! Wires the settlement, crew, clock and scheduler together and runs the
//! tick loop for the configured number of pulses.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (first argument, else `habitat-config.yaml`, else
//!    defaults)
//! 2. Initialize structured logging (tracing)
//! 3. Build the settlement from its layout
//! 4. Create the Mars clock
//! 5. Spawn the crew and issue suits
//! 6. Create the activity selector and scheduler
//! 7. Run the tick loop
//! 8. Log the shutdown summary

mod error;
mod spawner;

use std::path::{Path, PathBuf};

use habitat_core::clock::MarsClock;
use habitat_core::colony::{Colony, build_settlement};
use habitat_core::config::{LogFormat, LoggingConfig, SimulationConfig};
use habitat_core::scheduler::TaskScheduler;
use habitat_core::selector::WeightedActivitySelector;
use habitat_tasks::{SimRng, TaskEnvironment};
use habitat_world::Malfunctionable;
use rand::SeedableRng;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Config file looked for in the working directory.
const DEFAULT_CONFIG_FILE: &str = "habitat-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or a tick fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = load_config(config_path.as_deref())?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("habitat-engine starting");
    info!(
        settlement = %config.settlement.name,
        seed = config.population.seed,
        pulse_millisols = config.clock.pulse_millisols,
        tick_limit = config.clock.tick_limit,
        "Configuration loaded"
    );

    run(&config)?;
    info!("habitat-engine shutdown complete");
    Ok(())
}

/// Build the colony and run it to the tick limit.
fn run(config: &SimulationConfig) -> Result<(), EngineError> {
    // 3. Build the settlement.
    let mut settlement = build_settlement(&config.settlement)?;
    info!(
        stations = settlement.stations().len(),
        targets = settlement.targets().len(),
        nodes = settlement.computing().nodes().len(),
        "Settlement built"
    );

    // 4. Create the clock.
    let clock = MarsClock::new(&config.clock)?;
    info!(time = %clock.current_time(), "Mars clock initialized");

    // 5. Spawn the crew.
    let mut rng = SimRng::seed_from_u64(config.population.seed);
    let crew = spawner::spawn_crew(&config.population, &mut settlement, &mut rng)?;

    // 6. Selector and scheduler.
    let selector = WeightedActivitySelector::new(&config.activities.weights);
    info!(activities = ?selector.enabled().collect::<Vec<_>>(), "Activity selector ready");
    let mut scheduler = TaskScheduler::new(
        Box::new(selector),
        config.clock.pulse_millisols,
        config.population.seed.wrapping_add(1),
    );
    for agent in crew {
        scheduler.add_agent(agent);
    }
    let mut colony = Colony::new(clock, settlement, config.tasks.clone());

    // 7. Tick loop.
    info!(agents = scheduler.agents().count(), "Entering tick loop");
    for _ in 0..config.clock.tick_limit {
        let summary = scheduler.run_tick(&mut colony)?;
        info!(
            tick = summary.tick,
            time = %summary.time,
            started = summary.started,
            ended = summary.ended,
            busy = summary.active.len(),
            "tick complete"
        );
        if tracing::enabled!(tracing::Level::DEBUG) {
            match serde_json::to_string(&summary.active) {
                Ok(json) => debug!(active = %json, "active tasks"),
                Err(e) => debug!(error = %e, "active tasks not serializable"),
            }
        }
    }

    // 8. Shutdown summary.
    log_shutdown(&scheduler, &colony);
    Ok(())
}

/// Load configuration from `path`, or the default file, or defaults.
fn load_config(path: Option<&Path>) -> Result<SimulationConfig, EngineError> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    if path.exists() {
        Ok(SimulationConfig::from_file(path)?)
    } else {
        let mut config = SimulationConfig::default();
        config.apply_env_overrides()?;
        Ok(config)
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    match logging.format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

/// Log run totals and facility state.
fn log_shutdown(scheduler: &TaskScheduler, colony: &Colony) {
    let stats = scheduler.stats();
    let settlement = colony.settlement();
    let malfunctions: usize = settlement
        .targets()
        .iter()
        .map(|target| target.malfunction_count())
        .chain(settlement.computing().nodes().iter().map(|node| node.malfunction_count()))
        .sum();
    let computing_units: f64 = settlement
        .computing()
        .nodes()
        .iter()
        .map(|node| node.units_served())
        .sum();

    info!(
        ticks = stats.ticks,
        time = %colony.current_time(),
        earth_time = %colony.clock().earth_time(),
        tasks_started = stats.tasks_started,
        tasks_ended = stats.tasks_ended,
        guard_trips = stats.guard_trips,
        malfunctions,
        computing_units,
        "Simulation finished"
    );
    for agent in scheduler.agents() {
        info!(
            agent = %agent.name,
            stress = agent.condition.stress(),
            fatigue = agent.condition.fatigue(),
            performance = agent.condition.performance_rating(),
            "colonist state"
        );
    }
}
