//! The view a phase handler gets of its task, its agent and the world.

use habitat_agents::Agent;
use habitat_types::SkillType;
use habitat_world::{Malfunction, Malfunctionable, SimRng};
use rand::Rng;
use tracing::info;

use crate::environment::TaskEnvironment;
use crate::phase::PhaseOutcome;
use crate::task::TaskCore;

/// Stress added to an agent involved in an accident.
const ACCIDENT_STRESS: f64 = 10.0;

/// Everything a phase handler may touch during one dispatch.
pub struct TaskContext<'a> {
    /// Engine-owned task state.
    pub core: &'a mut TaskCore,
    /// The agent doing the task.
    pub agent: &'a mut Agent,
    /// Clock, settlement, sky and tunables.
    pub env: &'a dyn TaskEnvironment,
    /// Simulation randomness.
    pub rng: &'a mut SimRng,
}

impl TaskContext<'_> {
    /// Budget left, or `None` for open-ended tasks.
    pub fn remaining_budget(&self) -> Option<f64> {
        self.core.remaining_budget()
    }

    /// Time until `fraction` of the budget has been completed, never negative.
    ///
    /// Open-ended tasks report infinity.
    pub fn time_until_fraction(&self, fraction: f64) -> f64 {
        self.core.duration().map_or(f64::INFINITY, |duration| {
            (fraction * duration - self.core.time_completed()).max(0.0)
        })
    }

    /// Spend `time` against the budget: terminate once it runs out,
    /// otherwise consume everything and stay.
    pub fn run_to_budget<P>(&self, time: f64) -> PhaseOutcome<P> {
        match self.remaining_budget() {
            Some(left) if time >= left => PhaseOutcome::Terminate(time - left),
            _ => PhaseOutcome::Continue(0.0),
        }
    }

    /// Accrue experience in the task's own skill for `time` millisols.
    pub fn add_experience(&mut self, time: f64) {
        let impact = *self.core.impact();
        let Some(skill) = impact.skill else {
            return;
        };
        let points = impact.points_for(self.agent, time, self.core.teaching_modifier());
        self.core.accrue_experience(skill, points, time);
    }

    /// Accrue experience in an arbitrary skill.
    pub fn add_skill_experience(&mut self, skill: SkillType, points: f64, time: f64) {
        self.core.accrue_experience(skill, points, time);
    }

    /// Effective level of the task's skill at the agent's current performance.
    pub fn effective_skill(&self) -> u32 {
        self.core.impact().skill.map_or(0, |skill| {
            self.agent
                .skills
                .effective_level(skill, self.agent.condition.performance_rating())
        })
    }

    /// Roll for an accident against `target`.
    ///
    /// The chance is `base * skill_factor * wear_modifier * time`, capped at
    /// one, where skill levels up to 3 multiply by `4 - level` and higher
    /// levels divide by `level - 2`. `skill` defaults to the effective level
    /// of the task's own skill. On an accident the target gets a
    /// malfunction, the agent takes stress, and the task is asked to end.
    pub fn check_for_accident(
        &mut self,
        target: &dyn Malfunctionable,
        time: f64,
        base_chance: f64,
        skill: Option<u32>,
        location: Option<&str>,
    ) -> bool {
        if !time.is_finite() || time <= 0.0 || !base_chance.is_finite() || base_chance <= 0.0 {
            return false;
        }
        let level = skill.unwrap_or_else(|| self.effective_skill());
        let skill_factor = if level <= 3 {
            4.0 - f64::from(level)
        } else {
            1.0 / (f64::from(level) - 2.0)
        };
        let chance = (base_chance * skill_factor * target.accident_modifier() * time).min(1.0);
        if self.rng.random::<f64>() >= chance {
            return false;
        }

        target.report_malfunction(Malfunction {
            description: format!("accident during {}", self.core.name()),
            location: location.map(str::to_owned),
            reported_by: Some(self.agent.id),
            reported_at: Some(self.env.current_time()),
        });
        info!(
            agent = %self.agent.name,
            task = %self.core.name(),
            equipment = %target.entity_name(),
            chance,
            "accident"
        );
        self.agent.condition.add_stress(ACCIDENT_STRESS);
        self.core
            .request_end(format!("accident with {}", target.entity_name()));
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use habitat_types::PhysicalEffort;
    use habitat_world::{MaintenanceTarget, Settlement};
    use rand::SeedableRng;

    use super::*;
    use crate::environment::FixedEnvironment;
    use crate::experience::ExperienceImpact;

    fn fixture() -> (TaskCore, Agent, FixedEnvironment, SimRng) {
        let agent = Agent::new("Kit", 1);
        let core = TaskCore::new(
            "Maintain",
            agent.id,
            ExperienceImpact::new(Some(SkillType::Mechanics), PhysicalEffort::Low, 0.0),
        )
        .with_duration(100.0)
        .unwrap();
        (
            core,
            agent,
            FixedEnvironment::new(Settlement::new("Base")),
            SimRng::seed_from_u64(7),
        )
    }

    #[test]
    fn fraction_and_budget_helpers() {
        let (mut core, mut agent, env, mut rng) = fixture();
        core.add_time(40.0);
        let ctx = TaskContext {
            core: &mut core,
            agent: &mut agent,
            env: &env,
            rng: &mut rng,
        };
        assert!((ctx.time_until_fraction(0.9) - 50.0).abs() < 1e-9);
        assert!(ctx.time_until_fraction(0.3).abs() < 1e-9);
        assert_eq!(ctx.run_to_budget::<()>(10.0), PhaseOutcome::Continue(0.0));
        assert_eq!(ctx.run_to_budget::<()>(70.0), PhaseOutcome::Terminate(10.0));
    }

    #[test]
    fn certain_accident_reports_and_requests_end() {
        let (mut core, mut agent, env, mut rng) = fixture();
        let target = MaintenanceTarget::new("Pump", 1, 0.0).unwrap();
        let mut ctx = TaskContext {
            core: &mut core,
            agent: &mut agent,
            env: &env,
            rng: &mut rng,
        };
        assert!(ctx.check_for_accident(&target, 1.0, 1.0, None, Some("Hab 1")));
        assert_eq!(target.malfunction_count(), 1);
        assert!(core.take_end_request().is_some());
        assert!(agent.condition.stress() > 0.0);
    }

    #[test]
    fn skilled_agents_have_fewer_accidents() {
        let (mut core, mut agent, env, mut rng) = fixture();
        let target = MaintenanceTarget::new("Pump", 1, 0.0).unwrap();
        let mut ctx = TaskContext {
            core: &mut core,
            agent: &mut agent,
            env: &env,
            rng: &mut rng,
        };
        let mut hits: u32 = 0;
        for _ in 0..2_000 {
            if ctx.check_for_accident(&target, 1.0, 0.01, Some(12), None) {
                hits = hits.saturating_add(1);
            }
        }
        // 0.01 / 10 per roll: about two expected.
        assert!(hits < 15, "hits = {hits}");
    }
}
