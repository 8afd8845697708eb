//! Outdoor activities.
//!
//! [`EvaOperation`] wraps an [`OutsideActivity`] with the protocol every
//! outdoor task shares: walk out to the site, check readiness before each
//! slice of site work, and walk back inside when the work is finished or
//! anything makes it unsafe to stay out. The activity's own site phases
//! only run while the agent is on site and [`Readiness::ReadyToAct`].

use std::fmt;
use std::sync::Arc;

use habitat_agents::{Agent, SuitProblem};
use habitat_types::{NaturalAttribute, PhysicalEffort, SkillType};
use habitat_world::SimRng;
use tracing::{debug, info, warn};

use crate::context::TaskContext;
use crate::engine::{Task, TaskBehavior};
use crate::environment::TaskEnvironment;
use crate::error::TaskError;
use crate::experience::ExperienceImpact;
use crate::phase::{Phase, PhaseOutcome, PhaseTable};
use crate::task::TaskCore;

/// Stress added per millisol outside.
pub const EVA_STRESS_MODIFIER: f64 = 0.05;

/// Performance rating below which an agent is pulled back in.
const MIN_EVA_PERFORMANCE: f64 = 0.05;

/// Performance rating restored after pulling an agent back in.
const RECOVERY_PERFORMANCE: f64 = 0.1;

/// Millisols of outside work per EVA-operations experience point.
const EVA_EXPERIENCE_RATIO: f64 = 100.0;

/// Millisols of site work per outdoor-skill experience point.
const OUTDOOR_EXPERIENCE_RATIO: f64 = 10.0;

// ---------------------------------------------------------------------------
// Phases and readiness
// ---------------------------------------------------------------------------

/// Phases of an outdoor task. Site phases belong to the activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EvaPhase<P> {
    /// Suiting up, cycling the airlock and walking out.
    WalkToSite,
    /// Working on site in the activity's own phase.
    AtSite(P),
    /// Walking back and cycling in.
    WalkBackInside,
}

impl<P: Phase> Phase for EvaPhase<P> {
    fn name(&self) -> &'static str {
        match self {
            Self::WalkToSite => "walk to site",
            Self::AtSite(phase) => phase.name(),
            Self::WalkBackInside => "walk back inside",
        }
    }
}

/// Why an outdoor task is being cut short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// Someone asked the EVA to end.
    EndRequested,
    /// The agent crossed a hard fitness limit.
    SuperUnfit,
    /// The agent has no suit.
    NoSuit,
    /// The suit is unsafe.
    Suit(SuitProblem),
    /// The agent's performance collapsed.
    LowPerformance,
    /// A solar particle event is under way.
    Radiation,
    /// Not enough light to keep working.
    TooDark,
    /// Hungry, thirsty and sleepy, or stressed.
    Exhausted,
    /// The site can no longer be reached.
    SiteUnreachable,
    /// The planned time on site is used up.
    SiteTimeExpired,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndRequested => write!(f, "EVA ended on request"),
            Self::SuperUnfit => write!(f, "agent is not fit for EVA"),
            Self::NoSuit => write!(f, "no EVA suit"),
            Self::Suit(problem) => write!(f, "{problem}"),
            Self::LowPerformance => write!(f, "performance too low"),
            Self::Radiation => write!(f, "radiation alert"),
            Self::TooDark => write!(f, "too dark to work outside"),
            Self::Exhausted => write!(f, "agent is exhausted"),
            Self::SiteUnreachable => write!(f, "site unreachable"),
            Self::SiteTimeExpired => write!(f, "time on site used up"),
        }
    }
}

/// Result of the readiness gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// On site and safe to work.
    ReadyToAct,
    /// Safe, but not on site yet.
    NeedsMoreTime,
    /// Must head back in.
    AgentUnfit(AbortReason),
}

// ---------------------------------------------------------------------------
// Activity contract
// ---------------------------------------------------------------------------

/// Where outdoor work takes place.
#[derive(Debug, Clone, PartialEq)]
pub struct OutsideSite {
    /// Display name.
    pub name: String,
    /// Millisols to walk out, and again to walk back.
    pub travel_time: f64,
}

/// A concrete outdoor activity.
pub trait OutsideActivity: Send + Sized {
    /// The activity's site phases.
    type Phase: Phase;

    /// Task name.
    fn name(&self) -> String;

    /// Choose a site. `None` means there is nowhere to go and the task ends
    /// at construction.
    fn select_site(
        &mut self,
        agent: &Agent,
        env: &dyn TaskEnvironment,
        rng: &mut SimRng,
    ) -> Option<OutsideSite>;

    /// The site phase to run once the agent is ready on site.
    fn outside_site_phase(&self) -> Self::Phase;

    /// Register handlers for every site phase.
    fn register_phases(&self, table: &mut PhaseTable<Self, Self::Phase>);

    /// Planned millisols on site, if limited.
    fn site_duration(&self) -> Option<f64> {
        None
    }

    /// Skill practiced during site phases, beyond EVA operations.
    fn outdoor_skill(&self) -> Option<SkillType> {
        None
    }

    /// Whether work may continue in poor light.
    fn allow_partial(&self) -> bool {
        false
    }

    /// Whether the site can still be reached.
    fn is_site_reachable(&self, ctx: &TaskContext<'_>) -> bool {
        let _ = ctx;
        true
    }

    /// Activity cleanup, run once when the task ends.
    fn clear_down(&mut self, core: &mut TaskCore, agent: &mut Agent) {
        let _ = (core, agent);
    }

    /// Description for a site phase.
    fn phase_description(&self, phase: Self::Phase) -> Option<String> {
        let _ = phase;
        None
    }
}

// ---------------------------------------------------------------------------
// EvaOperation
// ---------------------------------------------------------------------------

/// The outdoor protocol around an [`OutsideActivity`].
pub struct EvaOperation<O: OutsideActivity> {
    /// The wrapped activity.
    activity: O,
    /// Where the work happens.
    site: OutsideSite,
    /// The activity's site phase handlers.
    site_table: PhaseTable<O, O::Phase>,
    /// Site phase currently running, mirrored from `AtSite`.
    site_phase: O::Phase,
    /// Millisols walked toward the site.
    travel_progress: f64,
    /// Millisols walked back.
    return_progress: f64,
    /// Millisols worked on site.
    time_on_site: f64,
    /// Set by [`Task::end_eva`].
    end_requested: bool,
    /// Result of the most recent readiness check.
    readiness: Readiness,
}

impl<O: OutsideActivity> EvaOperation<O> {
    /// Build an outdoor task for `agent`.
    ///
    /// Returns an already finished task when no site is found, the agent
    /// has no suit, or is too unfit to go out. An agent already outside
    /// starts directly on site.
    pub fn create(
        mut activity: O,
        agent: &mut Agent,
        env: &dyn TaskEnvironment,
        rng: &mut SimRng,
    ) -> Result<Task<Self>, TaskError> {
        let name = activity.name();
        let impact = ExperienceImpact::new(
            Some(SkillType::EvaOperations),
            PhysicalEffort::High,
            EVA_STRESS_MODIFIER,
        )
        .with_ratio(EVA_EXPERIENCE_RATIO);
        let core = TaskCore::new(name.clone(), agent.id, impact);

        let selected = activity.select_site(agent, env, rng);
        let mut site_table = PhaseTable::new();
        activity.register_phases(&mut site_table);

        let mut table = PhaseTable::new()
            .with(EvaPhase::WalkToSite, walk_to_site::<O>)
            .with(EvaPhase::WalkBackInside, walk_back_inside::<O>);
        for phase in site_table.phases() {
            table.register(EvaPhase::AtSite(phase), at_site::<O>);
        }

        let site_phase = activity.outside_site_phase();
        let unfit = agent.condition.is_super_unfit(&env.config().condition);
        let operation = Self {
            activity,
            site: selected.clone().unwrap_or_else(|| OutsideSite {
                name: String::new(),
                travel_time: 0.0,
            }),
            site_table,
            site_phase,
            travel_progress: 0.0,
            return_progress: 0.0,
            time_on_site: 0.0,
            end_requested: false,
            readiness: Readiness::NeedsMoreTime,
        };
        let mut task = Task::new(core, operation, table);

        let abort = if selected.is_none() {
            Some("no outside site available")
        } else if agent.suit.is_none() {
            Some("no EVA suit")
        } else if unfit {
            Some("agent is not fit for EVA")
        } else {
            None
        };
        if let Some(reason) = abort {
            debug!(agent = %agent.name, task = %name, reason, "cannot start EVA");
            task.end(agent);
            return Ok(task);
        }

        if agent.is_outside() {
            let travel_time = task.behavior().site.travel_time;
            task.behavior_mut().travel_progress = travel_time;
            task.set_phase(EvaPhase::AtSite(site_phase))?;
        } else {
            task.set_phase(EvaPhase::WalkToSite)?;
        }
        Ok(task)
    }

    /// The wrapped activity.
    pub const fn activity(&self) -> &O {
        &self.activity
    }

    /// The work site.
    pub const fn site(&self) -> &OutsideSite {
        &self.site
    }

    /// Result of the most recent readiness check.
    pub const fn readiness(&self) -> Readiness {
        self.readiness
    }

    /// Millisols worked on site.
    pub const fn time_on_site(&self) -> f64 {
        self.time_on_site
    }

    /// Whether the agent has reached the site.
    fn has_arrived(&self) -> bool {
        self.travel_progress >= self.site.travel_time
    }

    /// Decide whether it is safe to keep working outside.
    ///
    /// Checks run in a fixed order and the first failure wins. While the
    /// agent is still walking out a safe result is
    /// [`Readiness::NeedsMoreTime`].
    pub fn check_readiness(&self, ctx: &mut TaskContext<'_>, allow_partial: bool) -> Readiness {
        let env = ctx.env;
        let config = env.config();
        let condition = &config.condition;
        if self.end_requested {
            return Readiness::AgentUnfit(AbortReason::EndRequested);
        }
        if ctx.agent.condition.is_super_unfit(condition) {
            return Readiness::AgentUnfit(AbortReason::SuperUnfit);
        }
        let Some(suit) = ctx.agent.suit.as_ref() else {
            return Readiness::AgentUnfit(AbortReason::NoSuit);
        };
        if let Some(problem) = suit.problem() {
            return Readiness::AgentUnfit(AbortReason::Suit(problem));
        }
        if suit.is_water_low() {
            warn!(agent = %ctx.agent.name, water = suit.water(), "suit water low");
        }
        if ctx.agent.condition.performance_rating() < MIN_EVA_PERFORMANCE {
            ctx.agent.condition.set_performance_factor(RECOVERY_PERFORMANCE);
            return Readiness::AgentUnfit(AbortReason::LowPerformance);
        }
        let outdoor = env.outdoor_conditions();
        if outdoor.radiation_alert {
            return Readiness::AgentUnfit(AbortReason::Radiation);
        }
        if !allow_partial
            && (outdoor.getting_dark || outdoor.solar_irradiance <= config.eva_min_sunlight)
        {
            return Readiness::AgentUnfit(AbortReason::TooDark);
        }
        if ctx.agent.condition.is_exhausted(condition) {
            return Readiness::AgentUnfit(AbortReason::Exhausted);
        }
        if !self.activity.is_site_reachable(ctx) {
            return Readiness::AgentUnfit(AbortReason::SiteUnreachable);
        }
        if !self.has_arrived() {
            return Readiness::NeedsMoreTime;
        }
        if self
            .activity
            .site_duration()
            .is_some_and(|limit| self.time_on_site >= limit)
        {
            return Readiness::AgentUnfit(AbortReason::SiteTimeExpired);
        }
        Readiness::ReadyToAct
    }

    /// Run the gate and record its result.
    fn gate(&mut self, ctx: &mut TaskContext<'_>) -> Readiness {
        let allow_partial = self.activity.allow_partial();
        self.readiness = self.check_readiness(ctx, allow_partial);
        self.readiness
    }

    /// Head back in (or stop, if never out), consuming the tick.
    fn abort(&self, ctx: &TaskContext<'_>, reason: AbortReason) -> PhaseOutcome<EvaPhase<O::Phase>> {
        info!(
            agent = %ctx.agent.name,
            task = %ctx.core.name(),
            site = %self.site.name,
            reason = %reason,
            "EVA cut short"
        );
        if ctx.agent.is_outside() {
            PhaseOutcome::TransitionTo(EvaPhase::WalkBackInside, 0.0)
        } else {
            PhaseOutcome::Terminate(0.0)
        }
    }

    /// Accrue EVA-operations and outdoor-skill experience for site work.
    fn add_eva_experience(&self, ctx: &mut TaskContext<'_>, time: f64) {
        if time <= 0.0 {
            return;
        }
        let aptitude = f64::from(ctx.agent.attribute(NaturalAttribute::ExperienceAptitude));
        let factor = (1.0 + (aptitude - 50.0) / 100.0).max(0.0);
        let teaching = ctx.core.teaching_modifier();
        ctx.add_skill_experience(
            SkillType::EvaOperations,
            time / EVA_EXPERIENCE_RATIO * factor * teaching,
            time,
        );
        if let Some(skill) = self.activity.outdoor_skill() {
            ctx.add_skill_experience(skill, time / OUTDOOR_EXPERIENCE_RATIO * factor, time);
        }
    }
}

impl<O: OutsideActivity> TaskBehavior for EvaOperation<O> {
    type Phase = EvaPhase<O::Phase>;

    fn clear_down(&mut self, core: &mut TaskCore, agent: &mut Agent) {
        self.activity.clear_down(core, agent);
        if agent.is_outside() {
            warn!(agent = %agent.name, task = %core.name(), "EVA ended with agent outside, recalled");
            agent.go_inside();
            if let Some(suit) = agent.suit.as_mut() {
                suit.recharge();
            }
        }
    }

    fn is_interruptable(&self) -> bool {
        false
    }

    fn phase_description(&self, phase: Self::Phase) -> Option<String> {
        match phase {
            EvaPhase::WalkToSite => Some(format!("Walking to {}", self.site.name)),
            EvaPhase::AtSite(inner) => self.activity.phase_description(inner),
            EvaPhase::WalkBackInside => Some("Walking back inside".to_owned()),
        }
    }
}

impl<O: OutsideActivity> fmt::Debug for EvaOperation<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaOperation")
            .field("site", &self.site)
            .field("site_phase", &self.site_phase.name())
            .field("readiness", &self.readiness)
            .field("time_on_site", &self.time_on_site)
            .finish_non_exhaustive()
    }
}

impl<O: OutsideActivity> Task<EvaOperation<O>> {
    /// Cut the EVA short: walk back if the agent is outside, otherwise end.
    pub fn check_location(&mut self, agent: &mut Agent, reason: AbortReason) -> Result<(), TaskError> {
        if self.is_done() {
            return Ok(());
        }
        info!(agent = %agent.name, task = %self.core().name(), reason = %reason, "EVA recalled");
        if agent.is_outside() {
            self.set_phase(EvaPhase::WalkBackInside)
        } else {
            self.end(agent);
            Ok(())
        }
    }

    /// Ask the EVA to end at its next readiness check.
    pub const fn end_eva(&mut self) {
        self.behavior_mut().end_requested = true;
    }
}

// ---------------------------------------------------------------------------
// Phase handlers
// ---------------------------------------------------------------------------

type EvaOutcome<O> = Result<PhaseOutcome<EvaPhase<<O as OutsideActivity>::Phase>>, TaskError>;

fn walk_to_site<O: OutsideActivity>(
    op: &mut EvaOperation<O>,
    ctx: &mut TaskContext<'_>,
    time: f64,
) -> EvaOutcome<O> {
    match op.gate(ctx) {
        Readiness::AgentUnfit(reason) => return Ok(op.abort(ctx, reason)),
        Readiness::NeedsMoreTime => {}
        Readiness::ReadyToAct => {
            return Ok(PhaseOutcome::TransitionTo(EvaPhase::AtSite(op.site_phase), time));
        }
    }
    let left = op.site.travel_time - op.travel_progress;
    if time < left {
        op.travel_progress += time;
        return Ok(PhaseOutcome::Continue(0.0));
    }
    op.travel_progress = op.site.travel_time;
    ctx.agent.go_outside();
    op.site_phase = op.activity.outside_site_phase();
    debug!(agent = %ctx.agent.name, site = %op.site.name, "arrived on site");
    Ok(PhaseOutcome::TransitionTo(
        EvaPhase::AtSite(op.site_phase),
        time - left,
    ))
}

fn at_site<O: OutsideActivity>(
    op: &mut EvaOperation<O>,
    ctx: &mut TaskContext<'_>,
    time: f64,
) -> EvaOutcome<O> {
    match op.gate(ctx) {
        Readiness::AgentUnfit(reason) => return Ok(op.abort(ctx, reason)),
        Readiness::NeedsMoreTime => return Ok(PhaseOutcome::TransitionTo(EvaPhase::WalkToSite, 0.0)),
        Readiness::ReadyToAct => {}
    }

    let inner = op.site_phase;
    let Some(handler) = op.site_table.get(inner) else {
        return Err(TaskError::UnregisteredPhase {
            task: ctx.core.name().to_owned(),
            phase: inner.name(),
        });
    };
    let offered = op
        .activity
        .site_duration()
        .map_or(time, |limit| time.min((limit - op.time_on_site).max(0.0)));
    let held_back = time - offered;

    if let Some(suit) = ctx.agent.suit.as_mut() {
        suit.consume(offered);
    }
    let outcome = handler(&mut op.activity, ctx, offered)?;
    let remaining = outcome.remaining().clamp(0.0, offered);
    let worked = offered - remaining;
    op.time_on_site += worked;
    op.add_eva_experience(ctx, worked);

    let equipment = ctx.agent.suit.as_ref().map(|suit| Arc::clone(suit.equipment()));
    if let Some(equipment) = equipment {
        let level = ctx.agent.skills.effective_level(
            SkillType::EvaOperations,
            ctx.agent.condition.performance_rating(),
        );
        let chance = ctx.env.config().eva_accident_chance;
        ctx.check_for_accident(
            equipment.as_ref(),
            worked,
            chance,
            Some(level),
            Some(op.site.name.as_str()),
        );
    }
    if let Some(reason) = ctx.core.take_end_request() {
        info!(agent = %ctx.agent.name, reason = %reason, "returning inside");
        return Ok(PhaseOutcome::TransitionTo(
            EvaPhase::WalkBackInside,
            remaining + held_back,
        ));
    }

    Ok(match outcome {
        PhaseOutcome::Continue(_) => PhaseOutcome::Continue(remaining + held_back),
        PhaseOutcome::TransitionTo(next, _) => {
            if !op.site_table.contains(next) {
                return Err(TaskError::UnregisteredPhase {
                    task: ctx.core.name().to_owned(),
                    phase: next.name(),
                });
            }
            op.site_phase = next;
            PhaseOutcome::TransitionTo(EvaPhase::AtSite(next), remaining + held_back)
        }
        PhaseOutcome::Terminate(_) => {
            PhaseOutcome::TransitionTo(EvaPhase::WalkBackInside, remaining + held_back)
        }
    })
}

fn walk_back_inside<O: OutsideActivity>(
    op: &mut EvaOperation<O>,
    ctx: &mut TaskContext<'_>,
    time: f64,
) -> EvaOutcome<O> {
    if !ctx.agent.is_outside() {
        return Ok(PhaseOutcome::Terminate(time));
    }
    let left = op.site.travel_time - op.return_progress;
    if time < left {
        op.return_progress += time;
        if let Some(suit) = ctx.agent.suit.as_mut() {
            suit.consume(time);
        }
        return Ok(PhaseOutcome::Continue(0.0));
    }
    op.return_progress = op.site.travel_time;
    ctx.agent.go_inside();
    if let Some(suit) = ctx.agent.suit.as_mut() {
        suit.recharge();
    }
    debug!(agent = %ctx.agent.name, site = %op.site.name, "back inside");
    Ok(PhaseOutcome::Terminate(time - left.max(0.0)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use habitat_agents::EvaSuit;
    use habitat_world::{MaintenanceTarget, Settlement};
    use rand::SeedableRng;

    use super::*;
    use crate::environment::FixedEnvironment;
    use crate::runnable::Runnable;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Survey {
        Measure,
    }

    impl Phase for Survey {
        fn name(&self) -> &'static str {
            "measure"
        }
    }

    #[derive(Debug, Default)]
    struct Stub {
        calls: u32,
        no_site: bool,
    }

    fn measure(stub: &mut Stub, _ctx: &mut TaskContext<'_>, _time: f64) -> Result<PhaseOutcome<Survey>, TaskError> {
        stub.calls = stub.calls.saturating_add(1);
        Ok(PhaseOutcome::Continue(0.0))
    }

    impl OutsideActivity for Stub {
        type Phase = Survey;

        fn name(&self) -> String {
            "Survey".to_owned()
        }

        fn select_site(&mut self, _: &Agent, _: &dyn TaskEnvironment, _: &mut SimRng) -> Option<OutsideSite> {
            (!self.no_site).then(|| OutsideSite {
                name: "Ridge".to_owned(),
                travel_time: 10.0,
            })
        }

        fn outside_site_phase(&self) -> Survey {
            Survey::Measure
        }

        fn register_phases(&self, table: &mut PhaseTable<Self, Survey>) {
            table.register(Survey::Measure, measure);
        }

        fn site_duration(&self) -> Option<f64> {
            Some(30.0)
        }
    }

    fn suited(name: &str) -> Agent {
        let mut agent = Agent::new(name, 1);
        agent.suit = Some(EvaSuit::new(Arc::new(
            MaintenanceTarget::new("Suit", 1, 0.0).unwrap(),
        )));
        agent
    }

    fn env() -> (FixedEnvironment, SimRng) {
        let mut env = FixedEnvironment::new(Settlement::new("Base"));
        env.config.eva_accident_chance = 0.0;
        (env, SimRng::seed_from_u64(3))
    }

    #[test]
    fn walks_out_works_and_walks_back() {
        let mut agent = suited("Sol");
        let (env, mut rng) = env();
        let mut task = EvaOperation::create(Stub::default(), &mut agent, &env, &mut rng).unwrap();
        assert_eq!(task.phase(), Some(EvaPhase::WalkToSite));

        let left = task.advance(&mut agent, &env, &mut rng, 15.0).unwrap();
        assert!(agent.is_outside());
        assert_eq!(task.phase(), Some(EvaPhase::AtSite(Survey::Measure)));
        assert!((left - 5.0).abs() < 1e-9);

        for _ in 0..3 {
            task.advance(&mut agent, &env, &mut rng, 10.0).unwrap();
        }
        assert_eq!(task.behavior().activity().calls, 3);
        assert!((task.behavior().time_on_site() - 30.0).abs() < 1e-9);

        // Site time used up: gate fails, agent heads back.
        task.advance(&mut agent, &env, &mut rng, 10.0).unwrap();
        assert_eq!(task.phase(), Some(EvaPhase::WalkBackInside));
        assert_eq!(
            task.behavior().readiness(),
            Readiness::AgentUnfit(AbortReason::SiteTimeExpired)
        );
        task.advance(&mut agent, &env, &mut rng, 10.0).unwrap();
        assert!(task.is_done());
        assert!(agent.is_in_settlement());
        assert_eq!(task.behavior().activity().calls, 3);
    }

    #[test]
    fn no_suit_or_site_ends_at_construction() {
        let mut agent = Agent::new("Sol", 1);
        let (env, mut rng) = env();
        let task = EvaOperation::create(Stub::default(), &mut agent, &env, &mut rng).unwrap();
        assert!(task.is_done());

        let mut agent = suited("Sol");
        let stub = Stub {
            no_site: true,
            ..Stub::default()
        };
        let task = EvaOperation::create(stub, &mut agent, &env, &mut rng).unwrap();
        assert!(task.is_done());
    }

    #[test]
    fn agent_outside_starts_on_site() {
        let mut agent = suited("Sol");
        agent.go_outside();
        let (env, mut rng) = env();
        let task = EvaOperation::create(Stub::default(), &mut agent, &env, &mut rng).unwrap();
        assert_eq!(task.phase(), Some(EvaPhase::AtSite(Survey::Measure)));
        assert!(!Runnable::is_interruptable(&task));
    }

    #[test]
    fn check_location_sends_agent_back() {
        let mut agent = suited("Sol");
        let (env, mut rng) = env();
        let mut task = EvaOperation::create(Stub::default(), &mut agent, &env, &mut rng).unwrap();
        task.advance(&mut agent, &env, &mut rng, 10.0).unwrap();
        assert!(agent.is_outside());
        task.check_location(&mut agent, AbortReason::EndRequested).unwrap();
        assert_eq!(task.phase(), Some(EvaPhase::WalkBackInside));
        task.advance(&mut agent, &env, &mut rng, 10.0).unwrap();
        assert!(task.is_done());
        assert!(!agent.is_outside());
    }

    #[test]
    fn end_eva_skips_site_work_and_walks_back() {
        let mut agent = suited("Sol");
        let (env, mut rng) = env();
        let mut task = EvaOperation::create(Stub::default(), &mut agent, &env, &mut rng).unwrap();
        task.advance(&mut agent, &env, &mut rng, 10.0).unwrap();
        task.advance(&mut agent, &env, &mut rng, 5.0).unwrap();
        assert!(agent.is_outside());
        assert_eq!(task.behavior().activity().calls, 1);

        task.end_eva();
        task.advance(&mut agent, &env, &mut rng, 5.0).unwrap();
        assert_eq!(task.behavior().activity().calls, 1);
        assert_eq!(task.phase(), Some(EvaPhase::WalkBackInside));
        assert_eq!(
            task.behavior().readiness(),
            Readiness::AgentUnfit(AbortReason::EndRequested)
        );

        task.advance(&mut agent, &env, &mut rng, 10.0).unwrap();
        assert!(task.is_done());
        assert!(agent.is_in_settlement());
        assert_eq!(task.behavior().activity().calls, 1);
    }

    #[test]
    fn darkness_aborts_unless_partial_light_allowed() {
        let mut agent = suited("Sol");
        let (mut env, mut rng) = env();
        env.outdoor.getting_dark = true;
        let mut task = EvaOperation::create(Stub::default(), &mut agent, &env, &mut rng).unwrap();
        task.advance(&mut agent, &env, &mut rng, 5.0).unwrap();
        assert!(task.is_done());
        assert!(!agent.is_outside());
    }
}
