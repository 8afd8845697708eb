//! Experience impact descriptors.
//!
//! An [`ExperienceImpact`] says which skill a task trains, which pair of
//! natural attributes scales the gain, how physically demanding the work
//! is, and how it affects stress. The default gain formula is
//!
//! `points = (time / ratio) * (1 + (attr_a + attr_b - 100) / 100) * teaching`
//!
//! with `ratio` defaulting to 20 millisols per point.

use habitat_agents::Agent;
use habitat_types::{NaturalAttribute, PhysicalEffort, SkillType};

/// Default millisols of work per experience point.
pub const DEFAULT_EXPERIENCE_RATIO: f64 = 20.0;

/// How a task affects the agent doing it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExperienceImpact {
    /// Skill trained, if any.
    pub skill: Option<SkillType>,
    /// Attributes scaling the gain.
    pub attributes: (NaturalAttribute, NaturalAttribute),
    /// Millisols per experience point.
    pub experience_ratio: f64,
    /// Physical effort.
    pub effort: PhysicalEffort,
    /// Stress added per millisol (negative relaxes).
    pub stress_modifier: f64,
}

impl ExperienceImpact {
    /// Train `skill` at the default ratio, scaled by experience and
    /// academic aptitude.
    pub const fn new(skill: Option<SkillType>, effort: PhysicalEffort, stress_modifier: f64) -> Self {
        Self {
            skill,
            attributes: (
                NaturalAttribute::ExperienceAptitude,
                NaturalAttribute::AcademicAptitude,
            ),
            experience_ratio: DEFAULT_EXPERIENCE_RATIO,
            effort,
            stress_modifier,
        }
    }

    /// Use a different attribute pair.
    #[must_use]
    pub const fn with_attributes(mut self, a: NaturalAttribute, b: NaturalAttribute) -> Self {
        self.attributes = (a, b);
        self
    }

    /// Use a different experience ratio.
    #[must_use]
    pub const fn with_ratio(mut self, ratio: f64) -> Self {
        self.experience_ratio = ratio;
        self
    }

    /// Experience points earned by `agent` for `time` millisols of work.
    pub fn points_for(&self, agent: &Agent, time: f64, teaching_modifier: f64) -> f64 {
        if self.skill.is_none()
            || !time.is_finite()
            || time <= 0.0
            || !self.experience_ratio.is_finite()
            || self.experience_ratio <= 0.0
        {
            return 0.0;
        }
        let a = f64::from(agent.attribute(self.attributes.0));
        let b = f64::from(agent.attribute(self.attributes.1));
        let points = (time / self.experience_ratio) * (1.0 + (a + b - 100.0) / 100.0) * teaching_modifier;
        points.max(0.0)
    }

    /// Apply the per-millisol physical effects of `time` millisols of work.
    pub fn apply(&self, agent: &mut Agent, time: f64) {
        if !time.is_finite() || time <= 0.0 {
            return;
        }
        agent.condition.add_stress(self.stress_modifier * time);
        agent.condition.add_fatigue(self.effort.fatigue_rate() * time);
        agent.condition.add_muscle_soreness(self.effort.soreness_rate() * time);
    }
}
