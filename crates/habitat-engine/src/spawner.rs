//! Crew spawner for seeding the colony with its initial agents.
//!
//! At simulation start the spawner creates one agent per configured name,
//! rolls natural attributes and a handful of starting skills, spreads home
//! zones across the settlement's zones, and issues each agent an EVA suit
//! whose equipment record is registered with the settlement so it wears
//! and can be maintained like any other target.

use std::collections::BTreeSet;

use habitat_agents::{Agent, EvaSuit, NaturalAttributes};
use habitat_core::config::PopulationConfig;
use habitat_types::SkillType;
use habitat_world::{MaintenanceTarget, Settlement};
use rand::Rng;
use tracing::{debug, info};

use crate::error::EngineError;

// -----------------------------------------------------------------------
// Constants
// -----------------------------------------------------------------------

/// Skills a new colonist may start with some training in.
const WORK_SKILLS: [SkillType; 7] = [
    SkillType::Management,
    SkillType::Mechanics,
    SkillType::Computing,
    SkillType::Mathematics,
    SkillType::EvaOperations,
    SkillType::AreologySurvey,
    SkillType::Reporting,
];

/// Highest starting level for any skill.
const MAX_STARTING_LEVEL: u32 = 3;

/// Wear rate of a freshly issued suit.
const SUIT_WEAR_RATE: f64 = 0.02;

// -----------------------------------------------------------------------
// Spawning
// -----------------------------------------------------------------------

/// Create the starting crew.
///
/// Agents are returned in configuration order. When
/// `config.issue_suits` is set each agent gets a suit registered as a
/// maintenance target in its home zone.
pub fn spawn_crew<R: Rng + ?Sized>(
    config: &PopulationConfig,
    settlement: &mut Settlement,
    rng: &mut R,
) -> Result<Vec<Agent>, EngineError> {
    let zones: Vec<u32> = settlement
        .stations()
        .iter()
        .map(|station| station.zone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if zones.is_empty() {
        return Err(EngineError::Spawner {
            message: format!("settlement {} has no stations to house a crew", settlement.name()),
        });
    }

    let mut crew = Vec::with_capacity(config.agents.len());
    for (name, home_zone) in config.agents.iter().zip(zones.iter().copied().cycle()) {
        let mut agent = Agent::new(name.clone(), home_zone);
        agent.attributes = NaturalAttributes::random(rng);
        for skill in WORK_SKILLS {
            let level = rng.random_range(0..=MAX_STARTING_LEVEL);
            if level > 0 {
                agent.skills.set_level(skill, level);
            }
        }

        if config.issue_suits {
            let suit = MaintenanceTarget::new(format!("EVA suit ({name})"), home_zone, SUIT_WEAR_RATE)?;
            agent.suit = Some(EvaSuit::new(settlement.add_target(suit)));
        }

        debug!(agent = %agent.name, agent_id = %agent.id, home_zone, "colonist spawned");
        crew.push(agent);
    }

    info!(
        crew = crew.len(),
        zones = zones.len(),
        suits = config.issue_suits,
        "crew spawned"
    );
    Ok(crew)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use habitat_core::colony::build_settlement;
    use habitat_core::config::SettlementConfig;
    use habitat_tasks::SimRng;
    use rand::SeedableRng;

    use super::*;

    fn settlement() -> Settlement {
        build_settlement(&SettlementConfig::default()).unwrap()
    }

    #[test]
    fn spawns_one_agent_per_name() {
        let mut settlement = settlement();
        let mut rng = SimRng::seed_from_u64(1);
        let crew = spawn_crew(&PopulationConfig::default(), &mut settlement, &mut rng).unwrap();
        let names: Vec<&str> = crew.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Ada", "Bashir", "Chen", "Dagny", "Emeka", "Farah"]);
        let ids: BTreeSet<_> = crew.iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), crew.len());
    }

    #[test]
    fn home_zones_alternate_over_station_zones() {
        let mut settlement = settlement();
        let mut rng = SimRng::seed_from_u64(1);
        let crew = spawn_crew(&PopulationConfig::default(), &mut settlement, &mut rng).unwrap();
        let zones: Vec<u32> = crew.iter().map(|a| a.home_zone).collect();
        assert_eq!(zones, [1, 2, 1, 2, 1, 2]);
        assert!(crew.iter().all(|a| a.zone() == Some(a.home_zone)));
    }

    #[test]
    fn suits_are_registered_as_targets() {
        let mut settlement = settlement();
        let before = settlement.targets().len();
        let mut rng = SimRng::seed_from_u64(1);
        let crew = spawn_crew(&PopulationConfig::default(), &mut settlement, &mut rng).unwrap();
        assert!(crew.iter().all(|a| a.suit.is_some()));
        assert_eq!(settlement.targets().len(), before.saturating_add(crew.len()));
    }

    #[test]
    fn suits_can_be_withheld() {
        let mut settlement = settlement();
        let config = PopulationConfig {
            issue_suits: false,
            ..PopulationConfig::default()
        };
        let mut rng = SimRng::seed_from_u64(1);
        let crew = spawn_crew(&config, &mut settlement, &mut rng).unwrap();
        assert!(crew.iter().all(|a| a.suit.is_none()));
    }

    #[test]
    fn empty_settlement_is_rejected() {
        let mut settlement = Settlement::new("Empty");
        let mut rng = SimRng::seed_from_u64(1);
        assert!(spawn_crew(&PopulationConfig::default(), &mut settlement, &mut rng).is_err());
    }
}
