//! Office work: writing a report at an administration or management desk.

use habitat_agents::Agent;
use habitat_types::{FunctionType, PhysicalEffort, SkillType};
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

/// Phases of [`WriteReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReportPhase {
    /// Writing.
    Writing,
}

impl Phase for ReportPhase {
    fn name(&self) -> &'static str {
        "writing"
    }
}

/// Report writing.
#[derive(Debug, Default)]
pub struct WriteReport {
    /// Name of the station the agent sits at, if one was free.
    station: Option<String>,
}

impl WriteReport {
    /// Write for 30 to 60 millisols.
    ///
    /// Takes a seat at an administration station, then a management
    /// station; with neither free the agent writes wherever they are.
    pub fn create(
        agent: &mut Agent,
        env: &dyn TaskEnvironment,
        rng: &mut SimRng,
    ) -> Result<Task<Self>, TaskError> {
        let impact = ExperienceImpact::new(Some(SkillType::Reporting), PhysicalEffort::None, 0.1);
        let core = TaskCore::new("Write Report", agent.id, impact)
            .with_duration(rng.random_range(30.0..=60.0))?;
        let mut task = Task::new(
            core,
            Self::default(),
            PhaseTable::new().with(ReportPhase::Writing, writing),
        );
        let settlement = env.settlement();
        if !is_indoors(agent, settlement) {
            debug!(agent = %agent.name, "not indoors, cannot write report");
            task.end(agent);
            return Ok(task);
        }

        match settlement.acquire_seat(agent.id, agent.zone(), &FunctionType::OFFICE_FALLBACK) {
            Some(seat) => {
                task.behavior_mut().station = Some(seat.station().name().to_owned());
                task.core_mut().hold(Box::new(seat));
            }
            None => debug!(agent = %agent.name, "no office seat, writing in place"),
        }
        task.set_phase(ReportPhase::Writing)?;
        Ok(task)
    }

    /// Station the agent sits at, if any.
    pub fn station(&self) -> Option<&str> {
        self.station.as_deref()
    }
}

impl TaskBehavior for WriteReport {
    type Phase = ReportPhase;

    fn phase_description(&self, _phase: ReportPhase) -> Option<String> {
        Some(self.station.as_ref().map_or_else(
            || "Writing a report".to_owned(),
            |station| format!("Writing a report at {station}"),
        ))
    }
}

fn writing(
    _: &mut WriteReport,
    ctx: &mut TaskContext<'_>,
    time: f64,
) -> Result<PhaseOutcome<ReportPhase>, TaskError> {
    let worked = ctx.remaining_budget().map_or(time, |left| time.min(left));
    ctx.add_experience(worked);
    Ok(ctx.run_to_budget(time))
}
