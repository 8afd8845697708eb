//! Enumeration types shared across the Habitat workspace.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Skills and attributes
// ---------------------------------------------------------------------------

/// A trainable skill. Tasks award experience in one or more of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillType {
    /// Running settlement affairs, writing reports, reviewing assignments.
    Management,
    /// Maintaining and repairing equipment.
    Mechanics,
    /// Operating and tuning computing infrastructure.
    Computing,
    /// Mathematical modeling and analysis.
    Mathematics,
    /// Working outdoors in an EVA suit.
    EvaOperations,
    /// Surveying and collecting surface material.
    AreologySurvey,
    /// Explaining and documenting work for others.
    Reporting,
}

/// An innate attribute in the range `[0, 100]`, 50 being average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NaturalAttribute {
    /// How quickly the agent learns from practice.
    ExperienceAptitude,
    /// How quickly the agent learns from instruction.
    AcademicAptitude,
    /// How well the agent teaches others.
    Teaching,
    /// Physical stamina.
    Endurance,
    /// Physical strength.
    Strength,
    /// Tolerance to stress.
    StressResilience,
    /// Organizational ability.
    Leadership,
}

// ---------------------------------------------------------------------------
// Facilities
// ---------------------------------------------------------------------------

/// The function a seated station provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionType {
    /// Administration office desk.
    Administration,
    /// Management office desk.
    Management,
    /// Research laboratory bench.
    Research,
    /// Dining hall table.
    Dining,
    /// Living quarters.
    LivingAccommodation,
}

impl FunctionType {
    /// Fallback order for general desk work when no dedicated station is named.
    pub const DESK_FALLBACK: [Self; 4] = [
        Self::Research,
        Self::Administration,
        Self::Dining,
        Self::LivingAccommodation,
    ];

    /// Fallback order for office work (administration first, then management).
    pub const OFFICE_FALLBACK: [Self; 2] = [Self::Administration, Self::Management];
}

/// The kind of quality-ranked resource a selector is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Equipment ranked by time since last maintenance.
    MaintenanceTarget,
    /// Computing node ranked by entropy.
    ComputingNode,
}

// ---------------------------------------------------------------------------
// Task descriptors
// ---------------------------------------------------------------------------

/// Computing load class declared by a computing lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoadClass {
    /// Light background load.
    Low,
    /// Ordinary modeling load.
    Mid,
    /// Heavy simulation load.
    High,
}

impl LoadClass {
    /// Per-millisol draw seed range, as a fraction of the task duration.
    pub const fn seed_range(self) -> (f64, f64) {
        match self {
            Self::Low => (0.005, 0.01),
            Self::Mid => (0.01, 0.0175),
            Self::High => (0.0175, 0.025),
        }
    }
}

/// How physically demanding a task is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PhysicalEffort {
    /// Desk or resting work.
    #[default]
    None,
    /// Light physical work.
    Low,
    /// Strenuous physical work.
    High,
}

impl PhysicalEffort {
    /// True for any effort above [`PhysicalEffort::None`].
    pub const fn is_effort_driven(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Fatigue added per millisol of work at this effort.
    pub const fn fatigue_rate(self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Low => 0.05,
            Self::High => 0.15,
        }
    }

    /// Muscle soreness added per millisol of work at this effort.
    pub const fn soreness_rate(self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Low => 0.005,
            Self::High => 0.02,
        }
    }
}
