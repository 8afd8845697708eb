//! Preventive maintenance on the equipment most in need of it.

use std::sync::Arc;

use habitat_agents::Agent;
use habitat_types::{PhysicalEffort, SkillType};
use habitat_world::{MaintenanceTarget, SimRng, roll_any_zone};
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

/// Extra work per skill level, as a fraction of a millisol.
const SKILL_BONUS: f64 = 0.1;

/// Phases of [`MaintainEquipment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MaintainPhase {
    /// Servicing the target.
    Maintaining,
}

impl Phase for MaintainPhase {
    fn name(&self) -> &'static str {
        "maintaining"
    }
}

/// Equipment maintenance.
#[derive(Debug, Default)]
pub struct MaintainEquipment {
    /// The equipment being serviced.
    target: Option<Arc<MaintenanceTarget>>,
}

impl MaintainEquipment {
    /// Pick a target, worse ones more likely, and service it for up to
    /// 20 to 50 millisols.
    ///
    /// The search covers the agent's zone, or every zone on a small random
    /// chance. Ends at once if nothing needs maintenance.
    pub fn create(
        agent: &mut Agent,
        env: &dyn TaskEnvironment,
        rng: &mut SimRng,
    ) -> Result<Task<Self>, TaskError> {
        let impact = ExperienceImpact::new(Some(SkillType::Mechanics), PhysicalEffort::Low, 0.0);
        let core = TaskCore::new("Maintain Equipment", agent.id, impact)
            .with_duration(rng.random_range(20.0..=50.0))?;
        let mut task = Task::new(
            core,
            Self::default(),
            PhaseTable::new().with(MaintainPhase::Maintaining, maintaining),
        );
        let settlement = env.settlement();
        if !is_indoors(agent, settlement) {
            debug!(agent = %agent.name, "not indoors, cannot maintain");
            task.end(agent);
            return Ok(task);
        }
        let any_zone = roll_any_zone(env.config().any_zone_probability, rng);
        let Some(target) = settlement.worst_target(agent.zone(), any_zone, rng) else {
            debug!(agent = %agent.name, any_zone, "nothing to maintain");
            task.end(agent);
            return Ok(task);
        };
        task.behavior_mut().target = Some(target);
        task.set_phase(MaintainPhase::Maintaining)?;
        Ok(task)
    }

    /// The equipment being serviced.
    pub const fn target(&self) -> Option<&Arc<MaintenanceTarget>> {
        self.target.as_ref()
    }
}

impl TaskBehavior for MaintainEquipment {
    type Phase = MaintainPhase;

    fn phase_description(&self, _phase: MaintainPhase) -> Option<String> {
        self.target
            .as_ref()
            .map(|target| format!("Maintaining {}", target.name()))
    }
}

fn maintaining(
    maintain: &mut MaintainEquipment,
    ctx: &mut TaskContext<'_>,
    time: f64,
) -> Result<PhaseOutcome<MaintainPhase>, TaskError> {
    let Some(target) = maintain.target.clone() else {
        return Ok(PhaseOutcome::Terminate(time));
    };
    let worked = ctx.remaining_budget().map_or(time, |left| time.min(left));
    let work = worked * f64::from(ctx.effective_skill()).mul_add(SKILL_BONUS, 1.0);
    let staleness = target.service(work);
    ctx.add_experience(worked);

    let base = ctx.env.config().accident_base_chance;
    ctx.check_for_accident(target.as_ref(), worked, base, None, Some(target.name()));

    if staleness <= 0.0 {
        debug!(agent = %ctx.agent.name, equipment = %target.name(), "maintenance complete");
        return Ok(PhaseOutcome::Terminate(time - worked));
    }
    Ok(ctx.run_to_budget(time))
}
