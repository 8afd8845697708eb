//! Collecting regolith samples outside the settlement.

use habitat_agents::Agent;
use habitat_types::SkillType;
use habitat_world::SimRng;
use rand::Rng;

use crate::context::TaskContext;
use crate::environment::TaskEnvironment;
use crate::error::TaskError;
use crate::eva::{OutsideActivity, OutsideSite};
use crate::phase::{Phase, PhaseOutcome, PhaseTable};

/// Kilograms a sample bag holds.
pub const BAG_CAPACITY: f64 = 50.0;

/// Kilograms collected per millisol by an unskilled agent.
const COLLECTION_RATE: f64 = 0.5;

/// Extra collection per skill level, as a fraction of the base rate.
const SKILL_BONUS: f64 = 0.1;

/// Site phases of [`CollectRegolith`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegolithPhase {
    /// Digging and bagging.
    Collecting,
}

impl Phase for RegolithPhase {
    fn name(&self) -> &'static str {
        "collecting"
    }
}

/// Regolith collection, run inside an [`EvaOperation`](crate::eva::EvaOperation).
#[derive(Debug)]
pub struct CollectRegolith {
    /// Kilograms bagged so far.
    collected: f64,
    /// Planned millisols on site.
    site_duration: f64,
}

impl CollectRegolith {
    /// A fresh collection with an empty bag.
    pub const fn new() -> Self {
        Self {
            collected: 0.0,
            site_duration: 0.0,
        }
    }

    /// Kilograms bagged so far.
    pub const fn collected(&self) -> f64 {
        self.collected
    }
}

impl Default for CollectRegolith {
    fn default() -> Self {
        Self::new()
    }
}

impl OutsideActivity for CollectRegolith {
    type Phase = RegolithPhase;

    fn name(&self) -> String {
        "Collect Regolith".to_owned()
    }

    fn select_site(
        &mut self,
        _agent: &Agent,
        env: &dyn TaskEnvironment,
        rng: &mut SimRng,
    ) -> Option<OutsideSite> {
        self.site_duration = rng.random_range(60.0..=120.0);
        Some(OutsideSite {
            name: format!("{} regolith field {}", env.settlement().name(), rng.random_range(1..=9)),
            travel_time: env.config().eva_egress_time,
        })
    }

    fn outside_site_phase(&self) -> RegolithPhase {
        RegolithPhase::Collecting
    }

    fn register_phases(&self, table: &mut PhaseTable<Self, RegolithPhase>) {
        table.register(RegolithPhase::Collecting, collecting);
    }

    fn site_duration(&self) -> Option<f64> {
        Some(self.site_duration)
    }

    fn outdoor_skill(&self) -> Option<SkillType> {
        Some(SkillType::AreologySurvey)
    }

    fn phase_description(&self, _phase: RegolithPhase) -> Option<String> {
        Some("Collecting regolith".to_owned())
    }
}

fn collecting(
    collect: &mut CollectRegolith,
    ctx: &mut TaskContext<'_>,
    time: f64,
) -> Result<PhaseOutcome<RegolithPhase>, TaskError> {
    let level = ctx.agent.skills.effective_level(
        SkillType::AreologySurvey,
        ctx.agent.condition.performance_rating(),
    );
    let rate = COLLECTION_RATE * f64::from(level).mul_add(SKILL_BONUS, 1.0);
    let room = (BAG_CAPACITY - collect.collected).max(0.0);
    let needed = room / rate;
    if time >= needed {
        collect.collected = BAG_CAPACITY;
        return Ok(PhaseOutcome::Terminate(time - needed));
    }
    collect.collected += rate * time;
    Ok(PhaseOutcome::Continue(0.0))
}
