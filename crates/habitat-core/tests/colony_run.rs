//! Whole-colony runs with the default configuration.
//!
//! These tests build the settlement and crew the way the engine binary
//! does, run the scheduler for a stretch of simulated time, and check the
//! colony afterwards.

#![allow(clippy::unwrap_used)]

use habitat_agents::{Agent, EvaSuit, NaturalAttributes};
use habitat_core::clock::MarsClock;
use habitat_core::colony::{Colony, build_settlement};
use habitat_core::config::SimulationConfig;
use habitat_core::scheduler::{TaskScheduler, TickSummary};
use habitat_core::selector::WeightedActivitySelector;
use habitat_tasks::{SimRng, TaskEnvironment};
use habitat_world::MaintenanceTarget;
use rand::SeedableRng;

fn crewed_colony(config: &SimulationConfig) -> (Colony, TaskScheduler) {
    let settlement = build_settlement(&config.settlement).unwrap();
    let clock = MarsClock::new(&config.clock).unwrap();
    let mut colony = Colony::new(clock, settlement, config.tasks.clone());

    let selector = WeightedActivitySelector::new(&config.activities.weights);
    let mut scheduler = TaskScheduler::new(Box::new(selector), config.clock.pulse_millisols, config.population.seed);
    let mut rng = SimRng::seed_from_u64(config.population.seed);

    for name in &config.population.agents {
        let mut agent = Agent::new(name.clone(), 1);
        agent.attributes = NaturalAttributes::random(&mut rng);
        let suit = MaintenanceTarget::new(format!("{name}'s suit"), 1, 0.01).unwrap();
        agent.suit = Some(EvaSuit::new(colony.settlement_mut().add_target(suit)));
        scheduler.add_agent(agent);
    }
    (colony, scheduler)
}

fn run(config: &SimulationConfig, ticks: u32) -> Vec<TickSummary> {
    let (mut colony, mut scheduler) = crewed_colony(config);
    (0..ticks).map(|_| scheduler.run_tick(&mut colony).unwrap()).collect()
}

#[test]
fn a_sol_of_work_keeps_every_seat_within_capacity() {
    let config = SimulationConfig::default();
    let (mut colony, mut scheduler) = crewed_colony(&config);

    for _ in 0..200 {
        let summary = scheduler.run_tick(&mut colony).unwrap();
        for station in colony.settlement().stations() {
            assert!(station.current_holders() <= station.capacity(), "{} over capacity", station.name());
        }
        assert!(summary.active.len() <= config.population.agents.len());
    }

    let stats = scheduler.stats();
    assert_eq!(stats.ticks, 200);
    assert!(stats.tasks_started > 0);
    assert!(stats.tasks_ended > 0);
    assert_eq!(stats.guard_trips, 0);
    assert!(colony.current_time().sol >= 2);
}

#[test]
fn seeded_runs_are_reproducible() {
    let config = SimulationConfig::default();
    let first = run(&config, 120);
    let second = run(&config, 120);
    assert_eq!(first, second);
}

#[test]
fn weights_restrict_the_activity_mix() {
    let mut config = SimulationConfig::default();
    config.activities.weights.clear();
    config.activities.weights.insert(habitat_tasks::ActivityKind::Relax, 1.0);

    for summary in run(&config, 30) {
        assert!(summary.active.iter().all(|active| active.task == "Relax"));
    }
}
