//! Choosing what an idle agent does next.
//!
//! The scheduler asks a [`BehaviorSelector`] for a new task whenever an
//! agent has nothing running. The production implementation,
//! [`WeightedActivitySelector`], rolls over the configured activity
//! weights. Tests plug in scripted selectors through the same trait.

use std::collections::BTreeMap;

use habitat_agents::Agent;
use habitat_tasks::{ActivityKind, Runnable, SimRng, TaskEnvironment, TaskError};
use habitat_world::weighted_index;
use tracing::debug;

/// Creation attempts per call before the agent is left idle.
const MAX_ATTEMPTS: usize = 3;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A source of new tasks for idle agents.
pub trait BehaviorSelector: Send {
    /// Pick and create a task for `agent`, or `None` to leave it idle.
    ///
    /// # Errors
    ///
    /// Returns an error when task creation fails for a reason other than
    /// the task deciding not to start.
    fn select(
        &mut self,
        agent: &mut Agent,
        env: &dyn TaskEnvironment,
        rng: &mut SimRng,
    ) -> Result<Option<Box<dyn Runnable>>, TaskError>;
}

// ---------------------------------------------------------------------------
// Weighted activity selector
// ---------------------------------------------------------------------------

/// Picks an activity by configured weight and creates it.
///
/// Activities with a zero or negative weight are never chosen. A task that
/// ends during creation (no seat, no site, agent unfit) does not count: the
/// selector rolls again, up to three times.
#[derive(Debug, Clone)]
pub struct WeightedActivitySelector {
    /// Enabled activities and their weights, in stable order.
    weights: Vec<(ActivityKind, f64)>,
}

impl WeightedActivitySelector {
    /// Build a selector from activity weights.
    pub fn new(weights: &BTreeMap<ActivityKind, f64>) -> Self {
        let weights = weights
            .iter()
            .filter(|(_, w)| w.is_finite() && **w > 0.0)
            .map(|(kind, w)| (*kind, *w))
            .collect();
        Self { weights }
    }

    /// Activities this selector can choose from.
    pub fn enabled(&self) -> impl Iterator<Item = ActivityKind> + '_ {
        self.weights.iter().map(|(kind, _)| *kind)
    }
}

impl BehaviorSelector for WeightedActivitySelector {
    fn select(
        &mut self,
        agent: &mut Agent,
        env: &dyn TaskEnvironment,
        rng: &mut SimRng,
    ) -> Result<Option<Box<dyn Runnable>>, TaskError> {
        for _ in 0..MAX_ATTEMPTS {
            let Some(kind) = weighted_index(&self.weights, |(_, w)| *w, rng)
                .and_then(|index| self.weights.get(index))
                .map(|(kind, _)| *kind)
            else {
                return Ok(None);
            };
            let task = kind.create(agent, env, rng)?;
            if task.is_done() {
                debug!(agent = %agent.name, activity = %kind, "activity declined to start");
                continue;
            }
            debug!(agent = %agent.name, activity = %kind, task_id = %task.id(), "activity selected");
            return Ok(Some(task));
        }
        Ok(None)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use habitat_tasks::FixedEnvironment;
    use habitat_types::FunctionType;
    use habitat_world::{Settlement, Station};
    use rand::SeedableRng;

    use super::*;

    fn env() -> FixedEnvironment {
        let mut settlement = Settlement::new("Test");
        settlement.add_station(Station::new("Office", FunctionType::Administration, 1, 4).unwrap());
        FixedEnvironment::new(settlement)
    }

    #[test]
    fn only_positive_weights_are_enabled() {
        let weights = BTreeMap::from([
            (ActivityKind::Relax, 1.0),
            (ActivityKind::WriteReport, 0.0),
            (ActivityKind::RunModeling, -2.0),
        ]);
        let selector = WeightedActivitySelector::new(&weights);
        assert_eq!(selector.enabled().collect::<Vec<_>>(), vec![ActivityKind::Relax]);
    }

    #[test]
    fn single_activity_is_always_chosen() {
        let env = env();
        let mut agent = Agent::new("Ada", 1);
        let mut rng = SimRng::seed_from_u64(7);
        let mut selector = WeightedActivitySelector::new(&BTreeMap::from([(ActivityKind::Relax, 1.0)]));
        let task = selector.select(&mut agent, &env, &mut rng).unwrap().unwrap();
        assert_eq!(task.name(), "Relax");
        assert!(!task.is_done());
    }

    #[test]
    fn nothing_enabled_leaves_agent_idle() {
        let env = env();
        let mut agent = Agent::new("Ada", 1);
        let mut rng = SimRng::seed_from_u64(7);
        let mut selector = WeightedActivitySelector::new(&BTreeMap::new());
        assert!(selector.select(&mut agent, &env, &mut rng).unwrap().is_none());
    }

    #[test]
    fn activity_that_cannot_start_is_skipped() {
        // No suit and no reachable site: every regolith run ends at creation.
        let env = env();
        let mut agent = Agent::new("Ada", 1);
        let mut rng = SimRng::seed_from_u64(7);
        let mut selector =
            WeightedActivitySelector::new(&BTreeMap::from([(ActivityKind::CollectRegolith, 1.0)]));
        assert!(selector.select(&mut agent, &env, &mut rng).unwrap().is_none());
    }
}
