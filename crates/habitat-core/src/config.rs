//! Configuration loading and typed config structures for the Habitat simulation.
//!
//! The canonical configuration lives in `habitat-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.

use std::collections::BTreeMap;
use std::path::Path;

use habitat_tasks::{ActivityKind, TaskConfig};
use habitat_types::FunctionType;
use serde::Deserialize;

/// Environment variable overriding `population.seed`.
pub const SEED_ENV_VAR: &str = "HABITAT_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds impossible values.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `habitat-config.yaml`. Every field has a
/// default, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Settlement layout.
    #[serde(default)]
    pub settlement: SettlementConfig,

    /// Clock start and pulse size.
    #[serde(default)]
    pub clock: ClockConfig,

    /// Colonists.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Task tunables.
    #[serde(default)]
    pub tasks: TaskConfig,

    /// Activity selection weights.
    #[serde(default)]
    pub activities: ActivitiesConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `HABITAT_SEED` overrides `population.seed` when set.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(raw) = std::env::var(SEED_ENV_VAR) {
            self.population.seed = raw.trim().parse().map_err(|e| ConfigError::Invalid {
                reason: format!("{SEED_ENV_VAR}={raw} is not a u64: {e}"),
            })?;
        }
        Ok(())
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| Err(ConfigError::Invalid { reason });

        if !self.clock.pulse_millisols.is_finite() || self.clock.pulse_millisols <= 0.0 {
            return invalid(format!(
                "clock.pulse_millisols must be positive, got {}",
                self.clock.pulse_millisols
            ));
        }
        if self.population.agents.is_empty() {
            return invalid("population.agents must name at least one colonist".to_owned());
        }
        for (name, value) in [
            ("tasks.accident_base_chance", self.tasks.accident_base_chance),
            ("tasks.eva_accident_chance", self.tasks.eva_accident_chance),
            ("tasks.any_zone_probability", self.tasks.any_zone_probability),
            ("tasks.eva_min_sunlight", self.tasks.eva_min_sunlight),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return invalid(format!("{name} must be in [0, 1], got {value}"));
            }
        }
        if !self.tasks.experience_ratio.is_finite() || self.tasks.experience_ratio <= 0.0 {
            return invalid("tasks.experience_ratio must be positive".to_owned());
        }
        if !self.tasks.eva_egress_time.is_finite() || self.tasks.eva_egress_time < 0.0 {
            return invalid("tasks.eva_egress_time must not be negative".to_owned());
        }
        if let Some((kind, weight)) = self
            .activities
            .weights
            .iter()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return invalid(format!("activities.weights.{kind} must be non-negative, got {weight}"));
        }
        if !self.activities.weights.values().any(|w| *w > 0.0) {
            return invalid("activities.weights needs at least one positive weight".to_owned());
        }
        if let Some(station) = self.settlement.stations.iter().find(|s| s.capacity == 0) {
            return invalid(format!("station {} has zero capacity", station.name));
        }
        Ok(())
    }
}

/// Settlement layout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SettlementConfig {
    /// Settlement name.
    #[serde(default = "default_settlement_name")]
    pub name: String,

    /// Seated stations.
    #[serde(default = "default_stations")]
    pub stations: Vec<StationConfig>,

    /// Equipment that needs maintenance.
    #[serde(default = "default_maintenance_targets")]
    pub maintenance_targets: Vec<MaintenanceTargetConfig>,

    /// Computing nodes.
    #[serde(default = "default_computing_nodes")]
    pub computing_nodes: Vec<ComputingNodeConfig>,

    /// Vehicles.
    #[serde(default)]
    pub vehicles: Vec<VehicleConfig>,

    /// Settlement-wide exclusive flags.
    #[serde(default = "default_flags")]
    pub flags: Vec<String>,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            name: default_settlement_name(),
            stations: default_stations(),
            maintenance_targets: default_maintenance_targets(),
            computing_nodes: default_computing_nodes(),
            vehicles: Vec::new(),
            flags: default_flags(),
        }
    }
}

/// One seated station.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StationConfig {
    /// Display name.
    pub name: String,
    /// What the station is for.
    pub function: FunctionType,
    /// Habitat zone.
    #[serde(default)]
    pub zone: u32,
    /// Seats.
    pub capacity: u32,
}

/// One piece of maintainable equipment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MaintenanceTargetConfig {
    /// Display name.
    pub name: String,
    /// Habitat zone.
    #[serde(default)]
    pub zone: u32,
    /// Condition lost per millisol, in percent.
    #[serde(default = "default_wear_rate")]
    pub wear_rate: f64,
}

/// One computing node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComputingNodeConfig {
    /// Display name.
    pub name: String,
    /// Habitat zone.
    #[serde(default)]
    pub zone: u32,
    /// Units served per millisol.
    pub peak_per_millisol: f64,
}

/// One vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VehicleConfig {
    /// Display name.
    pub name: String,
    /// Whether it starts parked in a garage.
    #[serde(default = "default_true")]
    pub garaged: bool,
}

/// Clock start and pulse settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClockConfig {
    /// Mission sol to start on (1-based).
    #[serde(default = "default_start_sol")]
    pub start_sol: u32,

    /// Millisol of the start sol.
    #[serde(default = "default_start_millisol")]
    pub start_millisol: f64,

    /// Millisols per tick.
    #[serde(default = "default_pulse_millisols")]
    pub pulse_millisols: f64,

    /// Ticks to run before shutting down; 0 runs until interrupted.
    #[serde(default = "default_tick_limit")]
    pub tick_limit: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            start_sol: default_start_sol(),
            start_millisol: default_start_millisol(),
            pulse_millisols: default_pulse_millisols(),
            tick_limit: default_tick_limit(),
        }
    }
}

/// Colonists.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PopulationConfig {
    /// Colonist names, one agent each.
    #[serde(default = "default_agents")]
    pub agents: Vec<String>,

    /// Seed for every random draw in the run.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Whether every colonist is issued an EVA suit.
    #[serde(default = "default_true")]
    pub issue_suits: bool,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            agents: default_agents(),
            seed: default_seed(),
            issue_suits: true,
        }
    }
}

/// Activity selection weights.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActivitiesConfig {
    /// Relative weight per activity. Missing activities are never chosen.
    #[serde(default = "default_activity_weights")]
    pub weights: BTreeMap<ActivityKind, f64>,
}

impl Default for ActivitiesConfig {
    fn default() -> Self {
        Self {
            weights: default_activity_weights(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_settlement_name() -> String {
    "Schiaparelli Base".to_owned()
}

fn default_stations() -> Vec<StationConfig> {
    vec![
        StationConfig {
            name: "Admin Office".to_owned(),
            function: FunctionType::Administration,
            zone: 1,
            capacity: 2,
        },
        StationConfig {
            name: "Command Center".to_owned(),
            function: FunctionType::Management,
            zone: 1,
            capacity: 1,
        },
        StationConfig {
            name: "Lab 1".to_owned(),
            function: FunctionType::Research,
            zone: 2,
            capacity: 3,
        },
        StationConfig {
            name: "Galley".to_owned(),
            function: FunctionType::Dining,
            zone: 2,
            capacity: 6,
        },
    ]
}

fn default_maintenance_targets() -> Vec<MaintenanceTargetConfig> {
    ["Water Recycler", "Oxygen Generator", "Airlock 1", "Greenhouse Pump"]
        .into_iter()
        .zip([1, 1, 2, 2])
        .map(|(name, zone)| MaintenanceTargetConfig {
            name: name.to_owned(),
            zone,
            wear_rate: default_wear_rate(),
        })
        .collect()
}

fn default_computing_nodes() -> Vec<ComputingNodeConfig> {
    vec![
        ComputingNodeConfig {
            name: "Core Node A".to_owned(),
            zone: 1,
            peak_per_millisol: 2.0,
        },
        ComputingNodeConfig {
            name: "Lab Node".to_owned(),
            zone: 2,
            peak_per_millisol: 1.0,
        },
    ]
}

fn default_flags() -> Vec<String> {
    vec![habitat_tasks::activities::REVIEW_FLAG.to_owned()]
}

const fn default_wear_rate() -> f64 {
    0.01
}

const fn default_start_sol() -> u32 {
    1
}

const fn default_start_millisol() -> f64 {
    250.0
}

const fn default_pulse_millisols() -> f64 {
    5.0
}

const fn default_tick_limit() -> u64 {
    400
}

fn default_agents() -> Vec<String> {
    ["Ada", "Bashir", "Chen", "Dagny", "Emeka", "Farah"]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

const fn default_seed() -> u64 {
    42
}

fn default_activity_weights() -> BTreeMap<ActivityKind, f64> {
    BTreeMap::from([
        (ActivityKind::Relax, 2.0),
        (ActivityKind::WriteReport, 3.0),
        (ActivityKind::ReviewJobReassignment, 0.5),
        (ActivityKind::MaintainEquipment, 3.0),
        (ActivityKind::TuneComputingNode, 1.0),
        (ActivityKind::RunModeling, 2.0),
        (ActivityKind::CollectRegolith, 1.5),
    ])
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}
