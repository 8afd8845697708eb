//! Computing nodes and time-sliced computing leases.
//!
//! Each [`ComputingNode`] can serve a fixed number of computing units per
//! millisol. At the start of every tick the pool replenishes each node's
//! budget for that tick; leases then draw against it. Serving work raises a
//! node's entropy, which tuning tasks bring back down.
//!
//! A [`ComputingLease`] asks for a total number of units at a per-millisol
//! seed rate. When the pool cannot cover the full draw the lease takes what
//! is there and records the shortfall; it never fails the owning task.

use std::sync::{Arc, Mutex};

use habitat_types::{AgentId, LoadClass, NodeId};
use rand::Rng;
use tracing::{debug, info};

use crate::error::WorldError;
use crate::lease::Lease;
use crate::malfunction::{Malfunction, Malfunctionable, WearState};
use crate::selection::weighted_index;

/// Entropy added per computing unit served.
const ENTROPY_PER_UNIT: f64 = 0.01;

/// Entropy added per millisol of uptime.
const ENTROPY_PER_MILLISOL: f64 = 0.001;

/// Entropy never drops below this floor.
pub const MIN_ENTROPY: f64 = 0.0;

/// Condition lost per millisol by a computing node.
const NODE_WEAR_RATE: f64 = 0.0005;

/// Draws smaller than this are treated as nothing.
const MIN_DRAW: f64 = 1e-9;

/// Mutable per-node state, guarded by one mutex per node.
#[derive(Debug)]
struct NodeState {
    /// Units still available this tick.
    available: f64,
    /// Accumulated disorder.
    entropy: f64,
    /// Total units served since creation.
    units_served: f64,
    /// Wear and malfunctions.
    wear: WearState,
}

/// A computing node.
#[derive(Debug)]
pub struct ComputingNode {
    /// Unique identifier.
    id: NodeId,
    /// Display name.
    name: String,
    /// Habitat zone.
    zone: u32,
    /// Units served per millisol at full capacity.
    peak_per_millisol: f64,
    /// Mutable state.
    state: Mutex<NodeState>,
}

impl ComputingNode {
    /// Create a node serving `peak_per_millisol` units per millisol.
    pub fn new(
        name: impl Into<String>,
        zone: u32,
        peak_per_millisol: f64,
    ) -> Result<Self, WorldError> {
        let name = name.into();
        if !peak_per_millisol.is_finite() || peak_per_millisol < 0.0 {
            return Err(WorldError::InvalidComputingCapacity {
                name,
                value: peak_per_millisol,
            });
        }
        let wear = WearState::new(&name, NODE_WEAR_RATE)?;
        Ok(Self {
            id: NodeId::new(),
            name,
            zone,
            peak_per_millisol,
            state: Mutex::new(NodeState {
                available: 0.0,
                entropy: MIN_ENTROPY,
                units_served: 0.0,
                wear,
            }),
        })
    }

    /// Node identifier.
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Habitat zone.
    pub const fn zone(&self) -> u32 {
        self.zone
    }

    /// Peak units per millisol.
    pub const fn peak_per_millisol(&self) -> f64 {
        self.peak_per_millisol
    }

    /// Units still available this tick. Zero while malfunctioning.
    pub fn available(&self) -> f64 {
        let Ok(state) = self.state.lock() else {
            return 0.0;
        };
        if state.wear.has_malfunction() {
            return 0.0;
        }
        state.available
    }

    /// Current entropy.
    pub fn entropy(&self) -> f64 {
        let Ok(state) = self.state.lock() else {
            return 0.0;
        };
        state.entropy
    }

    /// Total units served since creation.
    pub fn units_served(&self) -> f64 {
        let Ok(state) = self.state.lock() else {
            return 0.0;
        };
        state.units_served
    }

    /// Start a new tick of `time` millisols: refill capacity and age the node.
    pub fn replenish(&self, time: f64) {
        if !time.is_finite() || time <= 0.0 {
            return;
        }
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        state.available = self.peak_per_millisol * time;
        state.entropy += ENTROPY_PER_MILLISOL * time;
        state.wear.age(time);
    }

    /// Take up to `requested` units from this tick's budget.
    ///
    /// Returns the units actually granted.
    pub fn draw(&self, requested: f64) -> f64 {
        if !requested.is_finite() || requested <= 0.0 {
            return 0.0;
        }
        let Ok(mut state) = self.state.lock() else {
            return 0.0;
        };
        if state.wear.has_malfunction() {
            return 0.0;
        }
        let granted = requested.min(state.available).max(0.0);
        state.available -= granted;
        state.entropy += granted * ENTROPY_PER_UNIT;
        state.units_served += granted;
        granted
    }

    /// Apply `work` millisols of maintenance, returning the remaining
    /// staleness. Completed maintenance clears outstanding malfunctions.
    pub fn service(&self, work: f64) -> f64 {
        let Ok(mut state) = self.state.lock() else {
            return 0.0;
        };
        state.wear.service(work)
    }

    /// Lower entropy by up to `amount`, returning the reduction applied.
    pub fn reduce_entropy(&self, amount: f64) -> f64 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let Ok(mut state) = self.state.lock() else {
            return 0.0;
        };
        let before = state.entropy;
        state.entropy = (state.entropy - amount).max(MIN_ENTROPY);
        before - state.entropy
    }
}

impl Malfunctionable for ComputingNode {
    fn entity_name(&self) -> &str {
        &self.name
    }

    fn accident_modifier(&self) -> f64 {
        let Ok(state) = self.state.lock() else {
            return 1.0;
        };
        state.wear.accident_modifier()
    }

    fn has_malfunction(&self) -> bool {
        let Ok(state) = self.state.lock() else {
            return true;
        };
        state.wear.has_malfunction()
    }

    fn report_malfunction(&self, malfunction: Malfunction) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        info!(
            node = %self.name,
            description = %malfunction.description,
            "computing node malfunction reported"
        );
        state.wear.add_malfunction(malfunction);
    }

    fn malfunction_count(&self) -> usize {
        let Ok(state) = self.state.lock() else {
            return 0;
        };
        state.wear.malfunctions().len()
    }
}

// ---------------------------------------------------------------------------
// ComputingPool
// ---------------------------------------------------------------------------

/// The settlement's computing nodes.
#[derive(Debug, Default)]
pub struct ComputingPool {
    /// Nodes in registration order.
    nodes: Vec<Arc<ComputingNode>>,
}

impl ComputingPool {
    /// Create an empty pool.
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Add a node, returning a shared handle to it.
    pub fn add(&mut self, node: ComputingNode) -> Arc<ComputingNode> {
        let node = Arc::new(node);
        self.nodes.push(Arc::clone(&node));
        node
    }

    /// All nodes.
    pub fn nodes(&self) -> &[Arc<ComputingNode>] {
        &self.nodes
    }

    /// Refill every node for a tick of `time` millisols.
    pub fn replenish(&self, time: f64) {
        for node in &self.nodes {
            node.replenish(time);
        }
    }

    /// Units available across all nodes this tick.
    pub fn total_available(&self) -> f64 {
        self.nodes.iter().map(|node| node.available()).sum()
    }

    /// Draw up to `want` units, spreading across nodes.
    ///
    /// Nodes are picked one at a time, weighted by free capacity, until the
    /// request is covered or every node with capacity has been tried.
    /// Returns the units granted.
    pub fn draw<R: Rng + ?Sized>(&self, want: f64, rng: &mut R) -> f64 {
        if !want.is_finite() || want <= 0.0 {
            return 0.0;
        }
        let mut candidates: Vec<&Arc<ComputingNode>> = self
            .nodes
            .iter()
            .filter(|node| node.available() > MIN_DRAW)
            .collect();

        let mut remaining = want;
        let mut granted = 0.0;
        while remaining > MIN_DRAW {
            let Some(index) = weighted_index(&candidates, |node| node.available(), rng) else {
                break;
            };
            if index >= candidates.len() {
                break;
            }
            let node = candidates.swap_remove(index);
            let got = node.draw(remaining);
            remaining -= got;
            granted += got;
        }
        granted
    }
}

// ---------------------------------------------------------------------------
// ComputingLease
// ---------------------------------------------------------------------------

/// Outcome of one [`ComputingLease::process`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawReport {
    /// Units the lease wanted this tick.
    pub wanted: f64,
    /// Units actually granted.
    pub drawn: f64,
    /// True when the pool could not cover the full want.
    pub starved: bool,
}

/// A time-sliced claim against the computing pool.
///
/// Invariant: `units_consumed <= units_requested`.
#[derive(Debug)]
pub struct ComputingLease {
    /// The agent running the work.
    holder: AgentId,
    /// Task name, for the teardown report.
    task_name: String,
    /// Declared load class.
    load_class: LoadClass,
    /// Total units asked for.
    units_requested: f64,
    /// Units drawn so far.
    units_consumed: f64,
    /// Units drawn per millisol when capacity allows.
    seed: f64,
    /// Consecutive ticks that drew nothing.
    starved_ticks: u32,
    /// Set once the lease has been closed.
    released: bool,
}

impl ComputingLease {
    /// Create a lease for `units_requested` units at `seed` units per millisol.
    pub fn new(
        holder: AgentId,
        task_name: impl Into<String>,
        load_class: LoadClass,
        units_requested: f64,
        seed: f64,
    ) -> Result<Self, WorldError> {
        for value in [units_requested, seed] {
            if !value.is_finite() || value < 0.0 {
                return Err(WorldError::InvalidLeaseAmount { value });
            }
        }
        Ok(Self {
            holder,
            task_name: task_name.into(),
            load_class,
            units_requested,
            units_consumed: 0.0,
            seed,
            starved_ticks: 0,
            released: false,
        })
    }

    /// Size a lease for work lasting `duration` millisols.
    ///
    /// The seed is a random fraction of the duration taken from the load
    /// class range, and the request covers the whole duration at that seed.
    pub fn for_duration<R: Rng + ?Sized>(
        holder: AgentId,
        task_name: impl Into<String>,
        load_class: LoadClass,
        duration: f64,
        rng: &mut R,
    ) -> Result<Self, WorldError> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(WorldError::InvalidLeaseAmount { value: duration });
        }
        let (low, high) = load_class.seed_range();
        let seed = duration * rng.random_range(low..high);
        Self::new(holder, task_name, load_class, seed * duration, seed)
    }

    /// Declared load class.
    pub const fn load_class(&self) -> LoadClass {
        self.load_class
    }

    /// Total units asked for.
    pub const fn units_requested(&self) -> f64 {
        self.units_requested
    }

    /// Units drawn so far.
    pub const fn units_consumed(&self) -> f64 {
        self.units_consumed
    }

    /// Units still outstanding.
    pub fn remaining(&self) -> f64 {
        (self.units_requested - self.units_consumed).max(0.0)
    }

    /// Per-millisol draw seed.
    pub const fn seed(&self) -> f64 {
        self.seed
    }

    /// Consecutive ticks that drew nothing.
    pub const fn starved_ticks(&self) -> u32 {
        self.starved_ticks
    }

    /// Whether the full request has been served.
    pub fn is_satisfied(&self) -> bool {
        self.remaining() <= MIN_DRAW
    }

    /// Draw this tick's share for `time` millisols of work.
    ///
    /// Wants `min(remaining, seed * time)` and takes whatever the pool can
    /// give. A closed lease draws nothing.
    pub fn process<R: Rng + ?Sized>(
        &mut self,
        pool: &ComputingPool,
        time: f64,
        rng: &mut R,
    ) -> DrawReport {
        if self.released || !time.is_finite() || time <= 0.0 {
            return DrawReport {
                wanted: 0.0,
                drawn: 0.0,
                starved: false,
            };
        }
        let wanted = self.remaining().min(self.seed * time);
        let drawn = pool.draw(wanted, rng).min(self.remaining());
        self.units_consumed = (self.units_consumed + drawn).min(self.units_requested);

        if drawn <= MIN_DRAW && wanted > MIN_DRAW {
            self.starved_ticks = self.starved_ticks.saturating_add(1);
        } else {
            self.starved_ticks = 0;
        }
        let starved = wanted - drawn > MIN_DRAW;
        if starved {
            debug!(
                task = %self.task_name,
                agent = %self.holder,
                wanted,
                drawn,
                "insufficient computing capacity"
            );
        }
        DrawReport {
            wanted,
            drawn,
            starved,
        }
    }
}

impl Lease for ComputingLease {
    fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;
        info!(
            task = %self.task_name,
            agent = %self.holder,
            load = ?self.load_class,
            requested = self.units_requested,
            consumed = self.units_consumed,
            "computing lease closed"
        );
        true
    }

    fn is_released(&self) -> bool {
        self.released
    }

    fn label(&self) -> String {
        format!("computing lease for {}", self.task_name)
    }
}
