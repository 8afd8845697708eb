//! Skill levels and experience.
//!
//! Experience is fractional because tasks earn it per millisol. A skill
//! advances from level N to N+1 once `max(N, 1) * 100` points have
//! accumulated; leftover points carry over, so one large award can raise
//! several levels at once.
//!
//! The effective level used by accident checks is the raw level scaled by
//! the agent's current performance rating.

use std::collections::BTreeMap;

use habitat_types::SkillType;
use serde::{Deserialize, Serialize};

use crate::error::AgentError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum skill level an agent can reach.
pub const MAX_SKILL_LEVEL: u32 = 20;

/// Experience per level step.
const POINTS_PER_LEVEL: f64 = 100.0;

// ---------------------------------------------------------------------------
// SkillManager
// ---------------------------------------------------------------------------

/// Progress in one skill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillRecord {
    /// Current level.
    pub level: u32,
    /// Experience toward the next level.
    pub experience: f64,
    /// Total millisols spent practicing.
    pub time: f64,
}

/// Per-agent skill tracking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillManager {
    /// Skill records. Missing entries are level 0 with no experience.
    skills: BTreeMap<SkillType, SkillRecord>,
}

impl SkillManager {
    /// Create an empty skill manager.
    pub const fn new() -> Self {
        Self {
            skills: BTreeMap::new(),
        }
    }

    /// Set a starting level (used when creating colonists).
    pub fn set_level(&mut self, skill: SkillType, level: u32) {
        let record = self.skills.entry(skill).or_default();
        record.level = level.min(MAX_SKILL_LEVEL);
        record.experience = 0.0;
    }

    /// Current level of `skill`.
    pub fn level(&self, skill: SkillType) -> u32 {
        self.skills.get(&skill).map_or(0, |r| r.level)
    }

    /// Experience accumulated toward the next level of `skill`.
    pub fn experience(&self, skill: SkillType) -> f64 {
        self.skills.get(&skill).map_or(0.0, |r| r.experience)
    }

    /// Millisols spent practicing `skill`.
    pub fn time_spent(&self, skill: SkillType) -> f64 {
        self.skills.get(&skill).map_or(0.0, |r| r.time)
    }

    /// Experience needed to go from the current level to the next.
    ///
    /// Returns `None` at [`MAX_SKILL_LEVEL`].
    pub fn experience_for_next_level(&self, skill: SkillType) -> Option<f64> {
        let level = self.level(skill);
        if level >= MAX_SKILL_LEVEL {
            return None;
        }
        Some(f64::from(level.max(1)) * POINTS_PER_LEVEL)
    }

    /// Level scaled by a performance rating in `[0, 1]`, rounded to nearest.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn effective_level(&self, skill: SkillType, performance: f64) -> u32 {
        let performance = if performance.is_finite() {
            performance.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let scaled = (f64::from(self.level(skill)) * performance)
            .round()
            .clamp(0.0, f64::from(MAX_SKILL_LEVEL));
        // Clamped to [0, MAX_SKILL_LEVEL] above.
        scaled as u32
    }

    /// Award `points` experience and `time` millisols of practice.
    ///
    /// Returns `Some(new_level)` if the skill leveled up.
    pub fn add_experience(
        &mut self,
        skill: SkillType,
        points: f64,
        time: f64,
    ) -> Result<Option<u32>, AgentError> {
        for value in [points, time] {
            if !value.is_finite() || value < 0.0 {
                return Err(AgentError::InvalidExperience { skill, value });
            }
        }

        let record = self.skills.entry(skill).or_default();
        record.time += time;
        if record.level >= MAX_SKILL_LEVEL {
            return Ok(None);
        }
        record.experience += points;

        let original = record.level;
        while record.level < MAX_SKILL_LEVEL {
            let needed = f64::from(record.level.max(1)) * POINTS_PER_LEVEL;
            if record.experience < needed {
                break;
            }
            record.experience -= needed;
            record.level = record.level.saturating_add(1);
        }
        if record.level >= MAX_SKILL_LEVEL {
            record.experience = 0.0;
        }

        Ok((record.level > original).then_some(record.level))
    }
}
