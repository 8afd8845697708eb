//! Reviewing a job reassignment request.
//!
//! Only one review may run in the settlement at a time, which is enforced
//! by raising the [`REVIEW_FLAG`] for the life of the task. The reviewer
//! spends the first 90% of the budget reviewing and the rest approving.

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

/// Settlement flag held while a review is in progress.
pub const REVIEW_FLAG: &str = "job reassignment review";

/// Fraction of the budget spent reviewing before approval starts.
const REVIEW_FRACTION: f64 = 0.9;

/// Phases of [`ReviewJobReassignment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReviewPhase {
    /// Reading the request.
    Reviewing,
    /// Signing off.
    Approving,
}

impl Phase for ReviewPhase {
    fn name(&self) -> &'static str {
        match self {
            Self::Reviewing => "reviewing",
            Self::Approving => "approving",
        }
    }
}

/// Job reassignment review.
#[derive(Debug, Default)]
pub struct ReviewJobReassignment {
    /// Whether approval finished.
    approved: bool,
}

impl ReviewJobReassignment {
    /// Review for 20 to 50 millisols.
    pub fn create(
        agent: &mut Agent,
        env: &dyn TaskEnvironment,
        rng: &mut SimRng,
    ) -> Result<Task<Self>, TaskError> {
        Self::with_duration(agent, env, rng.random_range(20.0..=50.0))
    }

    /// Review for exactly `duration` millisols.
    ///
    /// Ends at once if the agent is not indoors, the settlement has no
    /// review flag, or another review already holds it.
    pub fn with_duration(
        agent: &mut Agent,
        env: &dyn TaskEnvironment,
        duration: f64,
    ) -> Result<Task<Self>, TaskError> {
        let impact = ExperienceImpact::new(Some(SkillType::Management), PhysicalEffort::None, 0.1);
        let core = TaskCore::new("Review Job Reassignment", agent.id, impact).with_duration(duration)?;
        let table = PhaseTable::new()
            .with(ReviewPhase::Reviewing, reviewing)
            .with(ReviewPhase::Approving, approving);
        let mut task = Task::new(core, Self::default(), table);

        let settlement = env.settlement();
        if !is_indoors(agent, settlement) {
            debug!(agent = %agent.name, "not indoors, cannot review");
            task.end(agent);
            return Ok(task);
        }
        let Some(flag) = settlement.flag(REVIEW_FLAG) else {
            debug!(agent = %agent.name, "settlement has no review flag");
            task.end(agent);
            return Ok(task);
        };
        let Some(lease) = flag.try_raise(agent.id) else {
            debug!(agent = %agent.name, "review already in progress");
            task.end(agent);
            return Ok(task);
        };
        task.core_mut().hold(Box::new(lease));

        match settlement.acquire_seat(agent.id, agent.zone(), &FunctionType::OFFICE_FALLBACK) {
            Some(seat) => task.core_mut().hold(Box::new(seat)),
            None => debug!(agent = %agent.name, "no office seat, reviewing in place"),
        }
        task.set_phase(ReviewPhase::Reviewing)?;
        Ok(task)
    }

    /// Whether the request was approved.
    pub const fn is_approved(&self) -> bool {
        self.approved
    }
}

impl TaskBehavior for ReviewJobReassignment {
    type Phase = ReviewPhase;

    fn phase_description(&self, phase: ReviewPhase) -> Option<String> {
        Some(
            match phase {
                ReviewPhase::Reviewing => "Reviewing a job reassignment",
                ReviewPhase::Approving => "Approving a job reassignment",
            }
            .to_owned(),
        )
    }
}

fn reviewing(
    _: &mut ReviewJobReassignment,
    ctx: &mut TaskContext<'_>,
    time: f64,
) -> Result<PhaseOutcome<ReviewPhase>, TaskError> {
    let until = ctx.time_until_fraction(REVIEW_FRACTION);
    ctx.add_experience(time.min(until));
    if time >= until {
        Ok(PhaseOutcome::TransitionTo(ReviewPhase::Approving, time - until))
    } else {
        Ok(PhaseOutcome::Continue(0.0))
    }
}

fn approving(
    review: &mut ReviewJobReassignment,
    ctx: &mut TaskContext<'_>,
    time: f64,
) -> Result<PhaseOutcome<ReviewPhase>, TaskError> {
    let worked = ctx.remaining_budget().map_or(time, |left| time.min(left));
    ctx.add_experience(worked);
    let outcome = ctx.run_to_budget(time);
    if matches!(outcome, PhaseOutcome::Terminate(_)) {
        review.approved = true;
        debug!(agent = %ctx.agent.name, "job reassignment approved");
    }
    Ok(outcome)
}
