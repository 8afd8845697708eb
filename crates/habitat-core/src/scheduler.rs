//! Per-tick task dispatch.
//!
//! Each tick the scheduler advances the colony clock, then walks the agents
//! in registration order. For every agent it ages the physical condition,
//! finds a task if the agent is idle, and hands the task the tick's time
//! until the time is used up or the task ends. Tasks return unused time
//! when they finish, so one tick can carry an agent through several phase
//! transitions.
//!
//! # Design Principles
//!
//! - Agents are processed sequentially in a fixed order, so a seeded run is
//!   reproducible.
//! - A task never receives more time than the tick offers.
//! - A dispatch guard stops a task that keeps returning the whole slice.

use habitat_agents::Agent;
use habitat_tasks::{Runnable, SimRng, TIME_TOLERANCE, TaskEnvironment, TaskError};
use habitat_types::{AgentId, MarsTime};
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clock::ClockError;
use crate::colony::Colony;
use crate::selector::BehaviorSelector;

/// Maximum `advance` calls per agent per tick.
pub const MAX_DISPATCHES_PER_TICK: u32 = 32;

// ---------------------------------------------------------------------------
// Errors and summaries
// ---------------------------------------------------------------------------

/// Errors raised while running a tick.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The clock refused to advance.
    #[error("clock error: {0}")]
    Clock(#[from] ClockError),

    /// A task failed while advancing or being created.
    #[error("agent {agent}: {source}")]
    Task {
        /// Name of the agent whose task failed.
        agent: String,
        /// The underlying task error.
        source: TaskError,
    },

    /// The requested agent is not registered.
    #[error("unknown agent: {0}")]
    UnknownAgent(AgentId),
}

/// What an agent is doing at the end of a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveTask {
    /// Agent name.
    pub agent: String,
    /// Task display name.
    pub task: String,
    /// Current description.
    pub description: String,
}

/// Summary of a completed tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickSummary {
    /// Tick number.
    pub tick: u64,
    /// Simulated time after the tick.
    pub time: MarsTime,
    /// Tasks started this tick.
    pub started: u32,
    /// Tasks that ended this tick.
    pub ended: u32,
    /// `advance` calls made this tick.
    pub dispatches: u32,
    /// Tasks still running, one per busy agent.
    pub active: Vec<ActiveTask>,
}

/// Totals across every tick the scheduler has run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Ticks run.
    pub ticks: u64,
    /// Tasks started.
    pub tasks_started: u64,
    /// Tasks ended, normally or not.
    pub tasks_ended: u64,
    /// Tasks cancelled through [`TaskScheduler::cancel`].
    pub tasks_cancelled: u64,
    /// Times the dispatch guard fired.
    pub guard_trips: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// One agent and the task it is running.
struct AgentSlot {
    agent: Agent,
    task: Option<Box<dyn Runnable>>,
}

/// Drives every agent's tasks forward, tick by tick.
pub struct TaskScheduler {
    /// Agents in registration order.
    slots: Vec<AgentSlot>,
    /// Source of new tasks.
    selector: Box<dyn BehaviorSelector>,
    /// Simulation randomness.
    rng: SimRng,
    /// Millisols per tick.
    pulse: f64,
    /// Running totals.
    stats: RunStats,
}

impl std::fmt::Debug for TaskScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskScheduler")
            .field("agents", &self.slots.len())
            .field("pulse", &self.pulse)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl TaskScheduler {
    /// Create a scheduler with no agents.
    pub fn new(selector: Box<dyn BehaviorSelector>, pulse: f64, seed: u64) -> Self {
        Self {
            slots: Vec::new(),
            selector,
            rng: SimRng::seed_from_u64(seed),
            pulse,
            stats: RunStats::default(),
        }
    }

    /// Register an agent. Agents are processed in registration order.
    pub fn add_agent(&mut self, agent: Agent) -> AgentId {
        let id = agent.id;
        self.slots.push(AgentSlot { agent, task: None });
        id
    }

    /// Registered agents, in processing order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.slots.iter().map(|slot| &slot.agent)
    }

    /// Look up an agent.
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.slot(id).map(|slot| &slot.agent)
    }

    /// The task an agent is running, if any.
    pub fn task_of(&self, id: AgentId) -> Option<&dyn Runnable> {
        self.slot(id).and_then(|slot| slot.task.as_deref())
    }

    /// Running totals.
    pub const fn stats(&self) -> RunStats {
        self.stats
    }

    fn slot(&self, id: AgentId) -> Option<&AgentSlot> {
        self.slots.iter().find(|slot| slot.agent.id == id)
    }

    /// Abandon an agent's current task.
    ///
    /// Returns `false` when the agent was idle.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::UnknownAgent`] for an unregistered id.
    pub fn cancel(&mut self, id: AgentId, reason: &str) -> Result<bool, SchedulerError> {
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.agent.id == id)
            .ok_or(SchedulerError::UnknownAgent(id))?;
        let Some(mut task) = slot.task.take() else {
            return Ok(false);
        };
        task.clear(&mut slot.agent, reason);
        self.stats.tasks_cancelled = self.stats.tasks_cancelled.saturating_add(1);
        self.stats.tasks_ended = self.stats.tasks_ended.saturating_add(1);
        Ok(true)
    }

    /// Advance the colony one pulse and run every agent's task for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the clock cannot advance or a task fails.
    pub fn run_tick(&mut self, colony: &mut Colony) -> Result<TickSummary, SchedulerError> {
        let pulse = colony.advance(self.pulse)?;
        let env: &dyn TaskEnvironment = &*colony;
        let condition = &env.config().condition;

        let mut started: u32 = 0;
        let mut ended: u32 = 0;
        let mut dispatches: u32 = 0;

        for slot in &mut self.slots {
            let agent = &mut slot.agent;
            agent.condition.time_passing(pulse.elapsed, condition);
            if pulse.new_sol {
                agent.condition.rest_and_refresh(condition);
            }

            if slot.task.is_none() {
                slot.task = self
                    .selector
                    .select(agent, env, &mut self.rng)
                    .map_err(|source| SchedulerError::Task {
                        agent: agent.name.clone(),
                        source,
                    })?;
                if slot.task.is_some() {
                    started = started.saturating_add(1);
                }
            }

            let Some(task) = slot.task.as_mut() else {
                continue;
            };

            let mut left = pulse.elapsed;
            let mut calls: u32 = 0;
            while left > TIME_TOLERANCE && !task.is_done() {
                if calls >= MAX_DISPATCHES_PER_TICK {
                    warn!(
                        agent = %agent.name,
                        task = %task.name(),
                        phase = ?task.phase_name(),
                        left,
                        "dispatch guard tripped, deferring to next tick"
                    );
                    self.stats.guard_trips = self.stats.guard_trips.saturating_add(1);
                    break;
                }
                left = task
                    .advance(agent, env, &mut self.rng, left)
                    .map_err(|source| SchedulerError::Task {
                        agent: agent.name.clone(),
                        source,
                    })?;
                calls = calls.saturating_add(1);
            }
            dispatches = dispatches.saturating_add(calls);

            if task.is_done() {
                debug!(
                    agent = %agent.name,
                    task = %task.name(),
                    completed = task.time_completed(),
                    "task finished"
                );
                slot.task = None;
                ended = ended.saturating_add(1);
            }
        }

        self.stats.ticks = self.stats.ticks.saturating_add(1);
        self.stats.tasks_started = self.stats.tasks_started.saturating_add(u64::from(started));
        self.stats.tasks_ended = self.stats.tasks_ended.saturating_add(u64::from(ended));

        let active = self
            .slots
            .iter()
            .filter_map(|slot| {
                slot.task.as_ref().map(|task| ActiveTask {
                    agent: slot.agent.name.clone(),
                    task: task.name().to_owned(),
                    description: task.description().to_owned(),
                })
            })
            .collect();

        if pulse.new_sol {
            info!(time = %pulse.time, "new sol");
        }

        Ok(TickSummary {
            tick: pulse.tick,
            time: pulse.time,
            started,
            ended,
            dispatches,
            active,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use habitat_tasks::TaskConfig;
    use habitat_tasks::activities::Relax;
    use habitat_types::FunctionType;
    use habitat_world::{Settlement, Station};

    use super::*;
    use crate::clock::MarsClock;
    use crate::selector::WeightedActivitySelector;

    /// Starts a relax task for every idle agent.
    struct AlwaysRelax;

    impl BehaviorSelector for AlwaysRelax {
        fn select(
            &mut self,
            agent: &mut Agent,
            env: &dyn TaskEnvironment,
            rng: &mut SimRng,
        ) -> Result<Option<Box<dyn Runnable>>, TaskError> {
            Ok(Some(Box::new(Relax::create(agent, env, rng)?)))
        }
    }

    fn colony() -> Colony {
        let mut settlement = Settlement::new("Test");
        settlement.add_station(Station::new("Office", FunctionType::Administration, 1, 4).unwrap());
        Colony::new(MarsClock::at(MarsTime::new(1, 300.0)), settlement, TaskConfig::default())
    }

    #[test]
    fn idle_agents_get_tasks() {
        let mut colony = colony();
        let mut scheduler = TaskScheduler::new(Box::new(AlwaysRelax), 5.0, 1);
        let ada = scheduler.add_agent(Agent::new("Ada", 1));
        let summary = scheduler.run_tick(&mut colony).unwrap();
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.started, 1);
        assert_eq!(summary.active.len(), 1);
        let task = scheduler.task_of(ada).unwrap();
        assert!((task.time_completed() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn finished_tasks_are_dropped_and_replaced() {
        let mut colony = colony();
        let mut scheduler = TaskScheduler::new(Box::new(AlwaysRelax), 10.0, 3);
        scheduler.add_agent(Agent::new("Ada", 1));
        for _ in 0..20 {
            scheduler.run_tick(&mut colony).unwrap();
        }
        let stats = scheduler.stats();
        assert_eq!(stats.ticks, 20);
        // 200 millisols of relaxing at no more than 40 each.
        assert!(stats.tasks_ended >= 4);
        assert!(stats.tasks_started >= stats.tasks_ended);
        assert_eq!(stats.guard_trips, 0);
    }

    #[test]
    fn cancel_clears_the_task() {
        let mut colony = colony();
        let mut scheduler = TaskScheduler::new(Box::new(AlwaysRelax), 1.0, 1);
        let ada = scheduler.add_agent(Agent::new("Ada", 1));
        scheduler.run_tick(&mut colony).unwrap();
        assert!(scheduler.cancel(ada, "emergency").unwrap());
        assert!(scheduler.task_of(ada).is_none());
        assert!(!scheduler.cancel(ada, "again").unwrap());
        assert_eq!(scheduler.stats().tasks_cancelled, 1);
    }

    #[test]
    fn unknown_agent_is_an_error() {
        let mut scheduler = TaskScheduler::new(Box::new(AlwaysRelax), 1.0, 1);
        let stranger = Agent::new("Nobody", 1).id;
        assert!(matches!(
            scheduler.cancel(stranger, "x"),
            Err(SchedulerError::UnknownAgent(id)) if id == stranger
        ));
    }

    #[test]
    fn summary_serializes_for_logging() {
        let mut colony = colony();
        let mut scheduler = TaskScheduler::new(Box::new(AlwaysRelax), 5.0, 1);
        scheduler.add_agent(Agent::new("Ada", 1));
        let summary = scheduler.run_tick(&mut colony).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json.pointer("/tick").and_then(serde_json::Value::as_u64), Some(1));
        assert_eq!(json.pointer("/active/0/agent").and_then(serde_json::Value::as_str), Some("Ada"));
        assert_eq!(json.pointer("/active/0/task").and_then(serde_json::Value::as_str), Some("Relax"));
    }

    #[test]
    fn agents_age_each_tick() {
        let mut colony = colony();
        let selector = WeightedActivitySelector::new(&BTreeMap::new());
        let mut scheduler = TaskScheduler::new(Box::new(selector), 20.0, 1);
        let ada = scheduler.add_agent(Agent::new("Ada", 1));
        let summary = scheduler.run_tick(&mut colony).unwrap();
        assert_eq!(summary.started, 0);
        assert!(summary.active.is_empty());
        assert!(scheduler.agent(ada).unwrap().condition.hunger() > 0.0);
    }
}
