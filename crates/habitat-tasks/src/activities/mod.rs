//! Concrete task configurations.
//!
//! Each activity is a thin configuration of the engine: a phase enum, a
//! behavior struct, a constructor that checks preconditions and claims
//! facilities, and one handler per phase.
//!
//! # Modules
//!
//! - [`collect_regolith`] -- Outdoor regolith collection (an EVA)
//! - [`maintain`] -- Worst-first equipment maintenance
//! - [`relax`] -- Unstructured downtime
//! - [`review_job`] -- Job reassignment review under a settlement flag
//! - [`run_modeling`] -- Modeling work drawing on the computing pool
//! - [`tune_node`] -- Worst-first computing node tuning
//! - [`write_report`] -- Office work with seat fallback

pub mod collect_regolith;
pub mod maintain;
pub mod relax;
pub mod review_job;
pub mod run_modeling;
pub mod tune_node;
pub mod write_report;

use habitat_agents::Agent;
use habitat_world::{Settlement, SimRng};
use serde::{Deserialize, Serialize};

use crate::environment::TaskEnvironment;
use crate::error::TaskError;
use crate::eva::EvaOperation;
use crate::runnable::Runnable;

pub use collect_regolith::CollectRegolith;
pub use maintain::MaintainEquipment;
pub use relax::Relax;
pub use review_job::{REVIEW_FLAG, ReviewJobReassignment};
pub use run_modeling::RunModeling;
pub use tune_node::TuneComputingNode;
pub use write_report::WriteReport;

/// Whether `agent` is somewhere indoor work can happen: inside a settlement
/// building, or in a vehicle parked in a garage.
pub fn is_indoors(agent: &Agent, settlement: &Settlement) -> bool {
    agent.is_in_settlement() || agent.vehicle().is_some_and(|v| settlement.is_in_garage(v))
}

/// Every activity a selector can start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// [`Relax`].
    Relax,
    /// [`WriteReport`].
    WriteReport,
    /// [`ReviewJobReassignment`].
    ReviewJobReassignment,
    /// [`MaintainEquipment`].
    MaintainEquipment,
    /// [`TuneComputingNode`].
    TuneComputingNode,
    /// [`RunModeling`].
    RunModeling,
    /// [`CollectRegolith`].
    CollectRegolith,
}

impl ActivityKind {
    /// All activity kinds.
    pub const ALL: [Self; 7] = [
        Self::Relax,
        Self::WriteReport,
        Self::ReviewJobReassignment,
        Self::MaintainEquipment,
        Self::TuneComputingNode,
        Self::RunModeling,
        Self::CollectRegolith,
    ];

    /// Start a task of this kind for `agent`.
    ///
    /// The task may already be done if a precondition failed.
    pub fn create(
        self,
        agent: &mut Agent,
        env: &dyn TaskEnvironment,
        rng: &mut SimRng,
    ) -> Result<Box<dyn Runnable>, TaskError> {
        Ok(match self {
            Self::Relax => Box::new(Relax::create(agent, env, rng)?),
            Self::WriteReport => Box::new(WriteReport::create(agent, env, rng)?),
            Self::ReviewJobReassignment => Box::new(ReviewJobReassignment::create(agent, env, rng)?),
            Self::MaintainEquipment => Box::new(MaintainEquipment::create(agent, env, rng)?),
            Self::TuneComputingNode => Box::new(TuneComputingNode::create(agent, env, rng)?),
            Self::RunModeling => Box::new(RunModeling::create(agent, env, rng)?),
            Self::CollectRegolith => {
                Box::new(EvaOperation::create(CollectRegolith::new(), agent, env, rng)?)
            }
        })
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Relax => "relax",
            Self::WriteReport => "write_report",
            Self::ReviewJobReassignment => "review_job_reassignment",
            Self::MaintainEquipment => "maintain_equipment",
            Self::TuneComputingNode => "tune_computing_node",
            Self::RunModeling => "run_modeling",
            Self::CollectRegolith => "collect_regolith",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use habitat_world::Vehicle;

    use super::*;

    #[test]
    fn garaged_vehicle_counts_as_indoors() {
        let mut settlement = Settlement::new("Base");
        let parked = settlement.add_vehicle(Vehicle::new("Rover 1", true));
        let roaming = settlement.add_vehicle(Vehicle::new("Rover 2", false));
        let mut agent = Agent::new("Jo", 1);
        assert!(is_indoors(&agent, &settlement));

        agent.location = habitat_agents::AgentLocation::InVehicle { vehicle: parked };
        assert!(is_indoors(&agent, &settlement));
        agent.location = habitat_agents::AgentLocation::InVehicle { vehicle: roaming };
        assert!(!is_indoors(&agent, &settlement));
        agent.go_outside();
        assert!(!is_indoors(&agent, &settlement));
    }

    #[test]
    fn kinds_use_snake_case() {
        let json = serde_json::to_string(&ActivityKind::ReviewJobReassignment).unwrap();
        assert_eq!(json, "\"review_job_reassignment\"");
        assert_eq!(ActivityKind::RunModeling.to_string(), "run_modeling");
    }
}
