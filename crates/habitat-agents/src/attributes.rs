//! Natural attributes.
//!
//! Every attribute lies in `[0, 100]` with 50 as the population average.
//! Attributes never change during a task; they scale experience gain and,
//! for teachers, the teaching modifier.

use std::collections::BTreeMap;

use habitat_types::NaturalAttribute;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Highest attribute value.
pub const MAX_ATTRIBUTE: u32 = 100;

/// Value of any attribute not explicitly set.
pub const AVERAGE_ATTRIBUTE: u32 = 50;

/// All attributes, in declaration order.
const ALL: [NaturalAttribute; 7] = [
    NaturalAttribute::ExperienceAptitude,
    NaturalAttribute::AcademicAptitude,
    NaturalAttribute::Teaching,
    NaturalAttribute::Endurance,
    NaturalAttribute::Strength,
    NaturalAttribute::StressResilience,
    NaturalAttribute::Leadership,
];

/// An agent's natural attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NaturalAttributes {
    /// Explicitly set values. Missing entries read as average.
    values: BTreeMap<NaturalAttribute, u32>,
}

impl NaturalAttributes {
    /// All attributes at the population average.
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Roll every attribute around the average (two dice, 20..=80).
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let values = ALL
            .iter()
            .map(|attr| {
                let a: u32 = rng.random_range(10..=40);
                let b: u32 = rng.random_range(0..=40);
                (*attr, a.saturating_add(b).min(MAX_ATTRIBUTE))
            })
            .collect();
        Self { values }
    }

    /// Value of `attribute`.
    pub fn get(&self, attribute: NaturalAttribute) -> u32 {
        self.values
            .get(&attribute)
            .copied()
            .unwrap_or(AVERAGE_ATTRIBUTE)
    }

    /// Set `attribute`, rejecting values above [`MAX_ATTRIBUTE`].
    pub fn set(&mut self, attribute: NaturalAttribute, value: u32) -> Result<(), AgentError> {
        if value > MAX_ATTRIBUTE {
            return Err(AgentError::AttributeOutOfRange { attribute, value });
        }
        self.values.insert(attribute, value);
        Ok(())
    }

    /// Builder-style [`Self::set`].
    pub fn with(mut self, attribute: NaturalAttribute, value: u32) -> Result<Self, AgentError> {
        self.set(attribute, value)?;
        Ok(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn unset_attributes_are_average() {
        let attrs = NaturalAttributes::new();
        assert_eq!(attrs.get(NaturalAttribute::Teaching), AVERAGE_ATTRIBUTE);
    }

    #[test]
    fn out_of_range_is_rejected() {
        let mut attrs = NaturalAttributes::new();
        assert!(attrs.set(NaturalAttribute::Strength, 101).is_err());
        assert!(attrs.set(NaturalAttribute::Strength, 100).is_ok());
        assert_eq!(attrs.get(NaturalAttribute::Strength), 100);
    }

    #[test]
    fn random_rolls_stay_in_range() {
        let mut rng = SmallRng::seed_from_u64(4);
        for _ in 0..100 {
            let attrs = NaturalAttributes::random(&mut rng);
            for attr in ALL {
                let v = attrs.get(attr);
                assert!((10..=80).contains(&v));
            }
        }
    }
}
