//! Unstructured downtime that sheds stress.

use habitat_agents::Agent;
use habitat_types::PhysicalEffort;
use habitat_world::SimRng;
use rand::Rng;
use tracing::debug;

use super::is_indoors;
use crate::context::TaskContext;
use crate::engine::{Task, TaskBehavior};
use crate::environment::TaskEnvironment;
use crate::error::TaskError;
use crate::experience::ExperienceImpact;
use crate::phase::{Phase, PhaseOutcome, PhaseTable};
use crate::task::TaskCore;

/// Stress change per millisol of rest.
const STRESS_MODIFIER: f64 = -0.3;

/// Phases of [`Relax`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RelaxPhase {
    /// Resting.
    Relaxing,
}

impl Phase for RelaxPhase {
    fn name(&self) -> &'static str {
        "relaxing"
    }
}

/// Downtime indoors.
#[derive(Debug, Default)]
pub struct Relax;

impl Relax {
    /// Relax for 10 to 40 millisols. Ends at once if the agent is not indoors.
    pub fn create(
        agent: &mut Agent,
        env: &dyn TaskEnvironment,
        rng: &mut SimRng,
    ) -> Result<Task<Self>, TaskError> {
        let impact = ExperienceImpact::new(None, PhysicalEffort::None, STRESS_MODIFIER);
        let core = TaskCore::new("Relax", agent.id, impact).with_duration(rng.random_range(10.0..=40.0))?;
        let mut task = Task::new(core, Self, PhaseTable::new().with(RelaxPhase::Relaxing, relaxing));
        if !is_indoors(agent, env.settlement()) {
            debug!(agent = %agent.name, "not indoors, cannot relax");
            task.end(agent);
            return Ok(task);
        }
        task.set_phase(RelaxPhase::Relaxing)?;
        Ok(task)
    }
}

impl TaskBehavior for Relax {
    type Phase = RelaxPhase;

    fn phase_description(&self, _phase: RelaxPhase) -> Option<String> {
        Some("Relaxing".to_owned())
    }
}

fn relaxing(_: &mut Relax, ctx: &mut TaskContext<'_>, time: f64) -> Result<PhaseOutcome<RelaxPhase>, TaskError> {
    Ok(ctx.run_to_budget(time))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use habitat_world::Settlement;
    use rand::SeedableRng;

    use super::*;
    use crate::environment::FixedEnvironment;

    #[test]
    fn relaxing_sheds_stress_until_budget_runs_out() {
        let env = FixedEnvironment::new(Settlement::new("Base"));
        let mut rng = SimRng::seed_from_u64(11);
        let mut agent = Agent::new("Noor", 1);
        agent.condition.add_stress(30.0);
        let mut task = Relax::create(&mut agent, &env, &mut rng).unwrap();
        let budget = task.core().duration().unwrap();
        assert!((10.0..=40.0).contains(&budget));

        let left = task.advance(&mut agent, &env, &mut rng, 50.0).unwrap();
        assert!(task.is_done());
        assert!((left - (50.0 - budget)).abs() < 1e-9);
        assert!(agent.condition.stress() < 30.0);
    }

    #[test]
    fn outside_agent_cannot_relax() {
        let env = FixedEnvironment::new(Settlement::new("Base"));
        let mut rng = SimRng::seed_from_u64(11);
        let mut agent = Agent::new("Noor", 1);
        agent.go_outside();
        let task = Relax::create(&mut agent, &env, &mut rng).unwrap();
        assert!(task.is_done());
    }
}
