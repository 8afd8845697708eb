//! The phase-driven task engine.
//!
//! A [`Task`] pairs the engine-owned [`TaskCore`] with a configuration's own
//! state (its [`TaskBehavior`]) and the table of phase handlers. The
//! scheduler drives it with [`Task::advance`]: one call dispatches exactly
//! one handler, validates the remainder, books the consumed time, and
//! applies the transition the handler asked for.

use habitat_agents::Agent;
use habitat_world::SimRng;
use tracing::{debug, trace, warn};

use crate::context::TaskContext;
use crate::environment::TaskEnvironment;
use crate::error::TaskError;
use crate::phase::{Phase, PhaseHandler, PhaseOutcome, PhaseTable};
use crate::task::TaskCore;

/// Remainders within this distance of the offered time (or of zero) are
/// treated as floating-point noise.
pub const TIME_TOLERANCE: f64 = 1e-6;

/// Performance rating restored when an effort-driven task stops an agent
/// who has nothing left.
const RECOVERY_PERFORMANCE: f64 = 0.1;

/// Configuration-specific state and hooks.
pub trait TaskBehavior: Send + Sized {
    /// The configuration's phase enum.
    type Phase: Phase;

    /// Configuration-specific cleanup, run once when the task ends.
    fn clear_down(&mut self, core: &mut TaskCore, agent: &mut Agent) {
        let _ = (core, agent);
    }

    /// Whether a scheduler may preempt the task.
    fn is_interruptable(&self) -> bool {
        true
    }

    /// Description to show while in `phase`, if it should change.
    fn phase_description(&self, phase: Self::Phase) -> Option<String> {
        let _ = phase;
        None
    }
}

/// One task instance.
pub struct Task<B: TaskBehavior> {
    /// Engine-owned state.
    core: TaskCore,
    /// Current phase, `None` until set.
    phase: Option<B::Phase>,
    /// Handlers by phase.
    table: PhaseTable<B, B::Phase>,
    /// Configuration state.
    behavior: B,
}

impl<B: TaskBehavior> Task<B> {
    /// Assemble a task with no phase set.
    pub const fn new(core: TaskCore, behavior: B, table: PhaseTable<B, B::Phase>) -> Self {
        Self {
            core,
            phase: None,
            table,
            behavior,
        }
    }

    /// Register a handler after construction.
    pub fn add_phase(&mut self, phase: B::Phase, handler: PhaseHandler<B, B::Phase>) {
        self.table.register(phase, handler);
    }

    /// Enter `phase`, which must be registered.
    pub fn set_phase(&mut self, phase: B::Phase) -> Result<(), TaskError> {
        if !self.table.contains(phase) {
            return Err(TaskError::UnregisteredPhase {
                task: self.core.name().to_owned(),
                phase: phase.name(),
            });
        }
        if let Some(description) = self.behavior.phase_description(phase) {
            self.core.set_description(description);
        }
        self.phase = Some(phase);
        Ok(())
    }

    /// Set the duration budget before the task starts.
    pub fn set_duration(&mut self, duration: f64) -> Result<(), TaskError> {
        self.core.set_duration(duration)
    }

    /// Offer `time` millisols to the current phase.
    ///
    /// Returns the unconsumed remainder. A finished task consumes nothing.
    pub fn advance(
        &mut self,
        agent: &mut Agent,
        env: &dyn TaskEnvironment,
        rng: &mut SimRng,
        time: f64,
    ) -> Result<f64, TaskError> {
        if self.core.is_done() {
            return Ok(time);
        }
        if !time.is_finite() || time < 0.0 {
            return Err(TaskError::InvalidTime {
                task: self.core.name().to_owned(),
                time,
            });
        }
        let Some(phase) = self.phase else {
            return Err(TaskError::NoPhase {
                task: self.core.name().to_owned(),
            });
        };
        if self.core.is_effort_driven() && agent.condition.performance_rating() <= 0.0 {
            agent.condition.set_performance_factor(RECOVERY_PERFORMANCE);
            debug!(agent = %agent.name, task = %self.core.name(), "too worn out to continue");
            self.end(agent);
            return Ok(time);
        }
        let Some(handler) = self.table.get(phase) else {
            return Err(TaskError::UnregisteredPhase {
                task: self.core.name().to_owned(),
                phase: phase.name(),
            });
        };
        self.core.mark_started();

        let outcome = {
            let mut ctx = TaskContext {
                core: &mut self.core,
                agent: &mut *agent,
                env,
                rng,
            };
            handler(&mut self.behavior, &mut ctx, time)?
        };

        let remaining = self.checked_remainder(phase, time, outcome.remaining())?;
        let consumed = time - remaining;
        self.core.add_time(consumed);
        self.core.impact().apply(agent, consumed);

        match outcome {
            PhaseOutcome::Continue(_) => {}
            PhaseOutcome::TransitionTo(next, _) => {
                trace!(task = %self.core.name(), from = phase.name(), to = next.name(), "phase transition");
                self.set_phase(next)?;
            }
            PhaseOutcome::Terminate(_) => {
                trace!(task = %self.core.name(), phase = phase.name(), "phase terminated task");
                self.end(agent);
            }
        }

        let end_request = self.core.take_end_request();
        if let Some(reason) = end_request.filter(|_| !self.core.is_done()) {
            debug!(task = %self.core.name(), reason = %reason, "ending on request");
            self.end(agent);
        }
        Ok(remaining)
    }

    /// Reject remainders outside `[0, offered]`, snapping noise.
    fn checked_remainder(
        &self,
        phase: B::Phase,
        offered: f64,
        remaining: f64,
    ) -> Result<f64, TaskError> {
        let invalid = || TaskError::InvalidRemainder {
            task: self.core.name().to_owned(),
            phase: phase.name(),
            offered,
            remaining,
        };
        if !remaining.is_finite() || remaining < -TIME_TOLERANCE || remaining > offered + TIME_TOLERANCE {
            return Err(invalid());
        }
        if remaining < TIME_TOLERANCE {
            return Ok(0.0);
        }
        Ok(remaining.min(offered))
    }

    /// End the task. Idempotent: cleanup, lease release and experience
    /// commit happen exactly once.
    pub fn end(&mut self, agent: &mut Agent) {
        if !self.core.mark_done() {
            return;
        }
        self.behavior.clear_down(&mut self.core, agent);
        self.core.release_all();
        self.core.commit_experience(agent);
        self.core.set_description("");
        debug!(
            agent = %agent.name,
            task = %self.core.name(),
            time_completed = self.core.time_completed(),
            "task ended"
        );
    }

    /// End the task early, logging why.
    pub fn clear_task(&mut self, agent: &mut Agent, reason: &str) {
        if !self.core.is_done() {
            warn!(agent = %agent.name, task = %self.core.name(), reason, "task cleared");
        }
        self.end(agent);
    }

    /// Whether the task has ended.
    pub const fn is_done(&self) -> bool {
        self.core.is_done()
    }

    /// Current description.
    pub fn description(&self) -> &str {
        self.core.description()
    }

    /// Current phase.
    pub const fn phase(&self) -> Option<B::Phase> {
        self.phase
    }

    /// Engine-owned state.
    pub const fn core(&self) -> &TaskCore {
        &self.core
    }

    /// Mutable engine-owned state.
    pub const fn core_mut(&mut self) -> &mut TaskCore {
        &mut self.core
    }

    /// Configuration state.
    pub const fn behavior(&self) -> &B {
        &self.behavior
    }

    /// Mutable configuration state.
    pub const fn behavior_mut(&mut self) -> &mut B {
        &mut self.behavior
    }
}

impl<B: TaskBehavior> std::fmt::Debug for Task<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.core.name())
            .field("phase", &self.phase.map(|p| p.name()))
            .field("time_completed", &self.core.time_completed())
            .field("done", &self.core.is_done())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use habitat_types::{NaturalAttribute, PhysicalEffort, SkillType};
    use habitat_world::{Settlement, SettlementFlag};
    use rand::SeedableRng;
    use std::sync::Arc;

    use super::*;
    use crate::environment::FixedEnvironment;
    use crate::experience::ExperienceImpact;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Step {
        Work,
        Wrap,
        Missing,
    }

    impl Phase for Step {
        fn name(&self) -> &'static str {
            match self {
                Self::Work => "work",
                Self::Wrap => "wrap",
                Self::Missing => "missing",
            }
        }
    }

    #[derive(Debug, Default)]
    struct Counter {
        cleared: u32,
        misbehave: bool,
    }

    impl TaskBehavior for Counter {
        type Phase = Step;

        fn clear_down(&mut self, _core: &mut TaskCore, _agent: &mut Agent) {
            self.cleared = self.cleared.saturating_add(1);
        }
    }

    fn work(b: &mut Counter, ctx: &mut TaskContext<'_>, time: f64) -> Result<PhaseOutcome<Step>, TaskError> {
        if b.misbehave {
            return Ok(PhaseOutcome::Continue(time + 1.0));
        }
        ctx.add_experience(time.min(ctx.time_until_fraction(0.5)));
        let until = ctx.time_until_fraction(0.5);
        if time >= until {
            Ok(PhaseOutcome::TransitionTo(Step::Wrap, time - until))
        } else {
            Ok(PhaseOutcome::Continue(0.0))
        }
    }

    fn wrap(_: &mut Counter, ctx: &mut TaskContext<'_>, time: f64) -> Result<PhaseOutcome<Step>, TaskError> {
        Ok(ctx.run_to_budget(time))
    }

    fn task(agent: &Agent) -> Task<Counter> {
        let core = TaskCore::new(
            "Counter",
            agent.id,
            ExperienceImpact::new(Some(SkillType::Management), PhysicalEffort::None, 0.0),
        )
        .with_duration(100.0)
        .unwrap();
        let table = PhaseTable::new().with(Step::Work, work).with(Step::Wrap, wrap);
        let mut task = Task::new(core, Counter::default(), table);
        task.set_phase(Step::Work).unwrap();
        task
    }

    fn env() -> (FixedEnvironment, SimRng) {
        (FixedEnvironment::new(Settlement::new("Base")), SimRng::seed_from_u64(1))
    }

    #[test]
    fn unregistered_phase_is_rejected() {
        let agent = Agent::new("Lee", 1);
        let mut task = task(&agent);
        assert!(matches!(
            task.set_phase(Step::Missing),
            Err(TaskError::UnregisteredPhase { phase: "missing", .. })
        ));
        assert_eq!(task.phase(), Some(Step::Work));
    }

    #[test]
    fn transition_keeps_leftover_time() {
        let mut agent = Agent::new("Lee", 1);
        let (env, mut rng) = env();
        let mut task = task(&agent);
        let left = task.advance(&mut agent, &env, &mut rng, 70.0).unwrap();
        assert!((left - 20.0).abs() < 1e-9);
        assert_eq!(task.phase(), Some(Step::Wrap));
        assert!((task.core().time_completed() - 50.0).abs() < 1e-9);

        let left = task.advance(&mut agent, &env, &mut rng, left).unwrap();
        assert!(left.abs() < 1e-9);
        let left = task.advance(&mut agent, &env, &mut rng, 40.0).unwrap();
        assert!((left - 10.0).abs() < 1e-9);
        assert!(task.is_done());
        assert!((task.core().time_completed() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn remainder_larger_than_offer_is_an_error() {
        let mut agent = Agent::new("Lee", 1);
        let (env, mut rng) = env();
        let mut task = task(&agent);
        task.behavior_mut().misbehave = true;
        assert!(matches!(
            task.advance(&mut agent, &env, &mut rng, 5.0),
            Err(TaskError::InvalidRemainder { .. })
        ));
    }

    #[test]
    fn invalid_time_and_missing_phase() {
        let mut agent = Agent::new("Lee", 1);
        let (env, mut rng) = env();
        let mut task = task(&agent);
        assert!(task.advance(&mut agent, &env, &mut rng, -1.0).is_err());
        assert!(task.advance(&mut agent, &env, &mut rng, f64::NAN).is_err());

        let core = TaskCore::new("Bare", agent.id, ExperienceImpact::new(None, PhysicalEffort::None, 0.0));
        let mut bare = Task::new(core, Counter::default(), PhaseTable::new());
        assert!(matches!(
            bare.advance(&mut agent, &env, &mut rng, 1.0),
            Err(TaskError::NoPhase { .. })
        ));
    }

    #[test]
    fn end_is_idempotent_and_releases_leases() {
        let mut agent = Agent::new("Lee", 1);
        let flag = Arc::new(SettlementFlag::new("review"));
        let mut task = task(&agent);
        task.core_mut().hold(Box::new(flag.try_raise(agent.id).unwrap()));
        assert!(flag.is_raised());

        task.end(&mut agent);
        task.end(&mut agent);
        task.clear_task(&mut agent, "again");
        assert_eq!(task.behavior().cleared, 1);
        assert!(!flag.is_raised());
        assert_eq!(task.core().held_count(), 0);
        assert_eq!(task.description(), "");
    }

    #[test]
    fn done_task_consumes_nothing() {
        let mut agent = Agent::new("Lee", 1);
        let (env, mut rng) = env();
        let mut task = task(&agent);
        task.end(&mut agent);
        assert!((task.advance(&mut agent, &env, &mut rng, 12.5).unwrap() - 12.5).abs() < 1e-12);
        assert!(task.core().time_completed().abs() < 1e-12);
    }

    #[test]
    fn experience_is_committed_at_end() {
        let mut agent = Agent::new("Lee", 1);
        let (env, mut rng) = env();
        let mut task = task(&agent);
        task.advance(&mut agent, &env, &mut rng, 40.0).unwrap();
        assert!(agent.skills.experience(SkillType::Management).abs() < 1e-12);
        task.end(&mut agent);
        assert!((agent.skills.experience(SkillType::Management) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn teaching_scales_committed_experience() {
        let (env, mut rng) = env();
        let mut teacher = Agent::new("Ada", 1);
        teacher.attributes.set(NaturalAttribute::Teaching, 30).unwrap();

        let mut untaught = Agent::new("Lee", 1);
        untaught.attributes.set(NaturalAttribute::AcademicAptitude, 70).unwrap();
        let mut plain = task(&untaught);
        plain.advance(&mut untaught, &env, &mut rng, 40.0).unwrap();
        plain.end(&mut untaught);
        let baseline = untaught.skills.experience(SkillType::Management);
        assert!((baseline - 2.4).abs() < 1e-9);

        let mut learner = Agent::new("Kim", 1);
        learner.attributes.set(NaturalAttribute::AcademicAptitude, 70).unwrap();
        let mut taught = task(&learner);
        taught.core_mut().set_teacher(&teacher, &learner);
        assert!((taught.core().teaching_modifier() - 2.0).abs() < 1e-12);
        taught.advance(&mut learner, &env, &mut rng, 40.0).unwrap();
        taught.end(&mut learner);

        // 1 + (Teaching 30 + AcademicAptitude 70) / 100
        let earned = learner.skills.experience(SkillType::Management);
        assert!((earned - baseline * 2.0).abs() < 1e-9);
    }

    #[test]
    fn effort_driven_task_stops_an_exhausted_agent() {
        let mut agent = Agent::new("Lee", 1);
        let (env, mut rng) = env();
        let core = TaskCore::new("Haul", agent.id, ExperienceImpact::new(None, PhysicalEffort::High, 0.0));
        let mut task = Task::new(core, Counter::default(), PhaseTable::new().with(Step::Work, wrap));
        task.set_phase(Step::Work).unwrap();
        agent.condition.set_performance_factor(0.0);
        let left = task.advance(&mut agent, &env, &mut rng, 5.0).unwrap();
        assert!((left - 5.0).abs() < 1e-12);
        assert!(task.is_done());
        assert!((agent.condition.performance_rating() - 0.1).abs() < 1e-12);
    }
}
