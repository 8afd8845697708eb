//! Object-safe handle the scheduler keeps per agent.

use habitat_agents::Agent;
use habitat_types::TaskId;
use habitat_world::SimRng;

use crate::engine::{Task, TaskBehavior};
use crate::environment::TaskEnvironment;
use crate::error::TaskError;
use crate::phase::Phase;

/// A task of any configuration, as seen by the scheduler.
pub trait Runnable: Send {
    /// See [`Task::advance`].
    fn advance(
        &mut self,
        agent: &mut Agent,
        env: &dyn TaskEnvironment,
        rng: &mut SimRng,
        time: f64,
    ) -> Result<f64, TaskError>;

    /// See [`Task::end`].
    fn end(&mut self, agent: &mut Agent);

    /// See [`Task::clear_task`].
    fn clear(&mut self, agent: &mut Agent, reason: &str);

    /// Whether the task has ended.
    fn is_done(&self) -> bool;

    /// Task identifier.
    fn id(&self) -> TaskId;

    /// Display label.
    fn name(&self) -> &str;

    /// Current description.
    fn description(&self) -> &str;

    /// Name of the current phase.
    fn phase_name(&self) -> Option<&'static str>;

    /// Whether a scheduler may preempt the task.
    fn is_interruptable(&self) -> bool;

    /// Millisols consumed so far.
    fn time_completed(&self) -> f64;
}

impl<B: TaskBehavior> Runnable for Task<B> {
    fn advance(
        &mut self,
        agent: &mut Agent,
        env: &dyn TaskEnvironment,
        rng: &mut SimRng,
        time: f64,
    ) -> Result<f64, TaskError> {
        Self::advance(self, agent, env, rng, time)
    }

    fn end(&mut self, agent: &mut Agent) {
        Self::end(self, agent);
    }

    fn clear(&mut self, agent: &mut Agent, reason: &str) {
        self.clear_task(agent, reason);
    }

    fn is_done(&self) -> bool {
        Self::is_done(self)
    }

    fn id(&self) -> TaskId {
        self.core().id()
    }

    fn name(&self) -> &str {
        self.core().name()
    }

    fn description(&self) -> &str {
        Self::description(self)
    }

    fn phase_name(&self) -> Option<&'static str> {
        self.phase().map(|p| p.name())
    }

    fn is_interruptable(&self) -> bool {
        self.behavior().is_interruptable()
    }

    fn time_completed(&self) -> f64 {
        self.core().time_completed()
    }
}
