//! Modeling work that consumes computing capacity.
//!
//! The task holds a [`ComputingLease`] and draws its share from the pool
//! every tick. A pool that cannot serve it only slows the work down; after
//! `max_starved_ticks` consecutive ticks with nothing drawn the task gives
//! up.

use habitat_agents::Agent;
use habitat_types::{FunctionType, LoadClass, PhysicalEffort, SkillType};
use habitat_world::{ComputingLease, Lease, SimRng};
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

const NAME: &str = "Run Modeling";

/// Phases of [`RunModeling`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModelingPhase {
    /// Running models.
    Modeling,
}

impl Phase for ModelingPhase {
    fn name(&self) -> &'static str {
        "modeling"
    }
}

/// Modeling on the settlement's computers.
#[derive(Debug, Default)]
pub struct RunModeling {
    /// The computing claim, closed in `clear_down`.
    lease: Option<ComputingLease>,
}

impl RunModeling {
    /// Model for 30 to 80 millisols with a random load class.
    pub fn create(
        agent: &mut Agent,
        env: &dyn TaskEnvironment,
        rng: &mut SimRng,
    ) -> Result<Task<Self>, TaskError> {
        let duration = rng.random_range(30.0..=80.0);
        let load_class = match rng.random_range(0..3) {
            0 => LoadClass::Low,
            1 => LoadClass::Mid,
            _ => LoadClass::High,
        };
        let lease = ComputingLease::for_duration(agent.id, NAME, load_class, duration, rng)?;
        Self::with_lease(agent, env, lease, duration)
    }

    /// Model for `duration` millisols against an already sized lease.
    ///
    /// Ends at once if the agent is not indoors or the settlement has no
    /// computing nodes. A desk is taken if one is free.
    pub fn with_lease(
        agent: &mut Agent,
        env: &dyn TaskEnvironment,
        lease: ComputingLease,
        duration: f64,
    ) -> Result<Task<Self>, TaskError> {
        let impact = ExperienceImpact::new(Some(SkillType::Mathematics), PhysicalEffort::None, 0.05);
        let core = TaskCore::new(NAME, agent.id, impact).with_duration(duration)?;
        let behavior = Self { lease: Some(lease) };
        let mut task = Task::new(
            core,
            behavior,
            PhaseTable::new().with(ModelingPhase::Modeling, modeling),
        );
        let settlement = env.settlement();
        if !is_indoors(agent, settlement) || settlement.computing().nodes().is_empty() {
            debug!(agent = %agent.name, "cannot run models here");
            task.end(agent);
            return Ok(task);
        }
        match settlement.acquire_seat(agent.id, agent.zone(), &FunctionType::DESK_FALLBACK) {
            Some(seat) => task.core_mut().hold(Box::new(seat)),
            None => debug!(agent = %agent.name, "no desk, modeling in place"),
        }
        task.set_phase(ModelingPhase::Modeling)?;
        Ok(task)
    }

    /// The computing claim, until the task ends.
    pub const fn lease(&self) -> Option<&ComputingLease> {
        self.lease.as_ref()
    }
}

impl TaskBehavior for RunModeling {
    type Phase = ModelingPhase;

    fn clear_down(&mut self, _core: &mut TaskCore, _agent: &mut Agent) {
        if let Some(lease) = self.lease.as_mut() {
            lease.release();
        }
    }

    fn phase_description(&self, _phase: ModelingPhase) -> Option<String> {
        Some("Running models".to_owned())
    }
}

fn modeling(
    model: &mut RunModeling,
    ctx: &mut TaskContext<'_>,
    time: f64,
) -> Result<PhaseOutcome<ModelingPhase>, TaskError> {
    let Some(lease) = model.lease.as_mut() else {
        return Ok(PhaseOutcome::Terminate(time));
    };
    let worked = ctx.remaining_budget().map_or(time, |left| time.min(left));
    let report = lease.process(ctx.env.settlement().computing(), worked, &mut *ctx.rng);
    ctx.add_experience(worked);

    if lease.is_satisfied() {
        debug!(agent = %ctx.agent.name, consumed = lease.units_consumed(), "modeling complete");
        return Ok(PhaseOutcome::Terminate(time - worked));
    }
    if lease.starved_ticks() >= ctx.env.config().max_starved_ticks {
        debug!(
            agent = %ctx.agent.name,
            starved_ticks = lease.starved_ticks(),
            wanted = report.wanted,
            "no computing capacity, giving up"
        );
        return Ok(PhaseOutcome::Terminate(time - worked));
    }
    Ok(ctx.run_to_budget(time))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use habitat_world::{ComputingNode, Settlement};
    use rand::SeedableRng;

    use super::*;
    use crate::environment::FixedEnvironment;

    fn lease(agent: &Agent) -> ComputingLease {
        ComputingLease::new(agent.id, NAME, LoadClass::Mid, 10.0, 1.0).unwrap()
    }

    #[test]
    fn gives_up_after_starving() {
        let mut settlement = Settlement::new("Base");
        settlement.add_node(ComputingNode::new("Node A", 1, 1.0).unwrap());
        let mut env = FixedEnvironment::new(settlement);
        env.config.max_starved_ticks = 3;
        let mut rng = SimRng::seed_from_u64(9);
        let mut agent = Agent::new("Ivy", 1);
        let lease = lease(&agent);
        let mut task = RunModeling::with_lease(&mut agent, &env, lease, 100.0).unwrap();

        // Never replenished: every draw comes back empty.
        for _ in 0..3 {
            task.advance(&mut agent, &env, &mut rng, 1.0).unwrap();
        }
        assert!(task.is_done());
        assert!(task.behavior().lease().unwrap().units_consumed().abs() < 1e-12);
    }

    #[test]
    fn finishes_once_the_lease_is_served() {
        let mut settlement = Settlement::new("Base");
        settlement.add_node(ComputingNode::new("Node A", 1, 5.0).unwrap());
        let env = FixedEnvironment::new(settlement);
        let mut rng = SimRng::seed_from_u64(9);
        let mut agent = Agent::new("Ivy", 1);
        let lease = lease(&agent);
        let mut task = RunModeling::with_lease(&mut agent, &env, lease, 100.0).unwrap();
        for _ in 0..10 {
            env.settlement.age(1.0);
            task.advance(&mut agent, &env, &mut rng, 1.0).unwrap();
        }
        assert!(task.is_done());
        assert!((task.behavior().lease().unwrap().units_consumed() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn no_nodes_ends_at_construction() {
        let env = FixedEnvironment::new(Settlement::new("Base"));
        let mut agent = Agent::new("Ivy", 1);
        let lease = lease(&agent);
        assert!(RunModeling::with_lease(&mut agent, &env, lease, 50.0).unwrap().is_done());
    }
}
