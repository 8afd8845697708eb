//! Tuning the computing node with the most entropy.

use std::sync::Arc;

use habitat_agents::Agent;
use habitat_types::{PhysicalEffort, SkillType};
use habitat_world::computing::MIN_ENTROPY;
use habitat_world::{ComputingNode, Malfunctionable, SimRng, roll_any_zone};
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

/// Entropy removed per millisol by an unskilled agent.
const ENTROPY_PER_MILLISOL: f64 = 0.005;

/// Extra entropy removed per skill level, as a fraction of the base rate.
const SKILL_BONUS: f64 = 0.2;

/// Phases of [`TuneComputingNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TunePhase {
    /// Tuning the node.
    Tuning,
}

impl Phase for TunePhase {
    fn name(&self) -> &'static str {
        "tuning"
    }
}

/// Computing node tuning.
#[derive(Debug, Default)]
pub struct TuneComputingNode {
    /// The node being tuned.
    node: Option<Arc<ComputingNode>>,
    /// Entropy removed so far.
    reduced: f64,
}

impl TuneComputingNode {
    /// Pick a node, higher entropy more likely, and tune it for 10 to 30
    /// millisols.
    ///
    /// Tuning also services the node, which clears a malfunction once the
    /// maintenance backlog is worked off.
    pub fn create(
        agent: &mut Agent,
        env: &dyn TaskEnvironment,
        rng: &mut SimRng,
    ) -> Result<Task<Self>, TaskError> {
        let impact = ExperienceImpact::new(Some(SkillType::Computing), PhysicalEffort::None, 0.05);
        let core = TaskCore::new("Tune Computing Node", agent.id, impact)
            .with_duration(rng.random_range(10.0..=30.0))?;
        let mut task = Task::new(
            core,
            Self::default(),
            PhaseTable::new().with(TunePhase::Tuning, tuning),
        );
        let settlement = env.settlement();
        if !is_indoors(agent, settlement) {
            debug!(agent = %agent.name, "not indoors, cannot tune");
            task.end(agent);
            return Ok(task);
        }
        let any_zone = roll_any_zone(env.config().any_zone_probability, rng);
        let Some(node) = settlement.worst_node(agent.zone(), any_zone, rng) else {
            debug!(agent = %agent.name, any_zone, "no node needs tuning");
            task.end(agent);
            return Ok(task);
        };
        task.behavior_mut().node = Some(node);
        task.set_phase(TunePhase::Tuning)?;
        Ok(task)
    }

    /// The node being tuned.
    pub const fn node(&self) -> Option<&Arc<ComputingNode>> {
        self.node.as_ref()
    }

    /// Entropy removed so far.
    pub const fn reduced(&self) -> f64 {
        self.reduced
    }
}

impl TaskBehavior for TuneComputingNode {
    type Phase = TunePhase;

    fn phase_description(&self, _phase: TunePhase) -> Option<String> {
        self.node.as_ref().map(|node| format!("Tuning {}", node.name()))
    }
}

fn tuning(
    tune: &mut TuneComputingNode,
    ctx: &mut TaskContext<'_>,
    time: f64,
) -> Result<PhaseOutcome<TunePhase>, TaskError> {
    let Some(node) = tune.node.clone() else {
        return Ok(PhaseOutcome::Terminate(time));
    };
    let worked = ctx.remaining_budget().map_or(time, |left| time.min(left));
    let rate = ENTROPY_PER_MILLISOL * f64::from(ctx.effective_skill()).mul_add(SKILL_BONUS, 1.0);
    tune.reduced += node.reduce_entropy(rate * worked);
    node.service(worked);
    ctx.add_experience(worked);

    let base = ctx.env.config().accident_base_chance;
    ctx.check_for_accident(node.as_ref(), worked, base, None, Some(node.name()));

    if node.entropy() <= MIN_ENTROPY && !node.has_malfunction() {
        debug!(agent = %ctx.agent.name, node = %node.name(), reduced = tune.reduced, "node fully tuned");
        return Ok(PhaseOutcome::Terminate(time - worked));
    }
    Ok(ctx.run_to_budget(time))
}
