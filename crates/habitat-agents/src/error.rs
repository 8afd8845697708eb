//! Error types for the habitat-agents crate.

use habitat_types::{NaturalAttribute, SkillType};

/// Errors that can occur during agent state operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A natural attribute was set outside `[0, 100]`.
    #[error("attribute {attribute:?} out of range: {value}")]
    AttributeOutOfRange {
        /// The attribute being set.
        attribute: NaturalAttribute,
        /// The rejected value.
        value: u32,
    },

    /// Experience points or time were negative or non-finite.
    #[error("invalid experience for {skill:?}: {value}")]
    InvalidExperience {
        /// The skill being trained.
        skill: SkillType,
        /// The rejected amount.
        value: f64,
    },
}
