//! The colonist aggregate.

use habitat_types::{AgentId, NaturalAttribute, VehicleId};
use serde::{Deserialize, Serialize};

use crate::attributes::NaturalAttributes;
use crate::condition::PhysicalCondition;
use crate::skills::SkillManager;
use crate::suit::EvaSuit;

/// Where an agent currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentLocation {
    /// Inside a settlement building in the given zone.
    InsideSettlement {
        /// Habitat zone of the building.
        zone: u32,
    },
    /// Inside a vehicle.
    InVehicle {
        /// The vehicle.
        vehicle: VehicleId,
    },
    /// On the surface in an EVA suit.
    Outside,
}

/// A colonist.
#[derive(Debug, Clone)]
pub struct Agent {
    /// Unique identifier.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Current location.
    pub location: AgentLocation,
    /// Zone of the agent's quarters; where they go back to after an EVA.
    pub home_zone: u32,
    /// Natural attributes.
    pub attributes: NaturalAttributes,
    /// Skills.
    pub skills: SkillManager,
    /// Physical condition.
    pub condition: PhysicalCondition,
    /// Assigned EVA suit, if any.
    pub suit: Option<EvaSuit>,
}

impl Agent {
    /// A new, average colonist indoors in `home_zone`.
    pub fn new(name: impl Into<String>, home_zone: u32) -> Self {
        Self {
            id: AgentId::new(),
            name: name.into(),
            location: AgentLocation::InsideSettlement { zone: home_zone },
            home_zone,
            attributes: NaturalAttributes::new(),
            skills: SkillManager::new(),
            condition: PhysicalCondition::new(),
            suit: None,
        }
    }

    /// Value of a natural attribute.
    pub fn attribute(&self, attribute: NaturalAttribute) -> u32 {
        self.attributes.get(attribute)
    }

    /// Zone of the building the agent is in, if inside the settlement.
    pub const fn zone(&self) -> Option<u32> {
        match self.location {
            AgentLocation::InsideSettlement { zone } => Some(zone),
            AgentLocation::InVehicle { .. } | AgentLocation::Outside => None,
        }
    }

    /// Whether the agent is on the surface.
    pub const fn is_outside(&self) -> bool {
        matches!(self.location, AgentLocation::Outside)
    }

    /// Whether the agent is inside a settlement building.
    pub const fn is_in_settlement(&self) -> bool {
        matches!(self.location, AgentLocation::InsideSettlement { .. })
    }

    /// The vehicle the agent is in, if any.
    pub const fn vehicle(&self) -> Option<VehicleId> {
        match self.location {
            AgentLocation::InVehicle { vehicle } => Some(vehicle),
            AgentLocation::InsideSettlement { .. } | AgentLocation::Outside => None,
        }
    }

    /// Step outside onto the surface.
    pub const fn go_outside(&mut self) {
        self.location = AgentLocation::Outside;
    }

    /// Return indoors to the home zone.
    pub const fn go_inside(&mut self) {
        self.location = AgentLocation::InsideSettlement {
            zone: self.home_zone,
        };
    }

    /// Teaching modifier when `self` teaches `learner`:
    /// `1 + (teacher Teaching + learner AcademicAptitude) / 100`.
    pub fn teaching_modifier_for(&self, learner: &Self) -> f64 {
        let teaching = f64::from(self.attribute(NaturalAttribute::Teaching));
        let aptitude = f64::from(learner.attribute(NaturalAttribute::AcademicAptitude));
        1.0 + (teaching + aptitude) / 100.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_agent_is_indoors() {
        let agent = Agent::new("Ada", 2);
        assert!(agent.is_in_settlement());
        assert_eq!(agent.zone(), Some(2));
        assert_eq!(agent.vehicle(), None);
    }

    #[test]
    fn outside_and_back() {
        let mut agent = Agent::new("Ada", 3);
        agent.go_outside();
        assert!(agent.is_outside());
        assert_eq!(agent.zone(), None);
        agent.go_inside();
        assert_eq!(agent.zone(), Some(3));
    }

    #[test]
    fn teaching_modifier_uses_both_agents() {
        let mut teacher = Agent::new("Teacher", 1);
        teacher.attributes.set(NaturalAttribute::Teaching, 80).unwrap();
        let mut learner = Agent::new("Learner", 1);
        learner
            .attributes
            .set(NaturalAttribute::AcademicAptitude, 40)
            .unwrap();
        assert!((teacher.teaching_modifier_for(&learner) - 2.2).abs() < 1e-9);
    }
}
