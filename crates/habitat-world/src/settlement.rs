//! The resource directory.
//!
//! [`Settlement`] owns every contended facility for the lifetime of the
//! settlement and answers the lookups tasks need: free stations by
//! function, worst-first candidates by resource kind, and garage state.
//! Facilities are shared through `Arc` handles so leases can outlive the
//! borrow that created them.

use std::collections::BTreeMap;
use std::sync::Arc;

use habitat_types::{AgentId, FunctionType, ResourceKind, VehicleId};
use rand::Rng;
use tracing::debug;

use crate::computing::{ComputingNode, ComputingPool};
use crate::error::WorldError;
use crate::flag::SettlementFlag;
use crate::maintenance::MaintenanceTarget;
use crate::malfunction::Malfunctionable;
use crate::selection::select_weighted;
use crate::station::{SeatLease, Station};
use crate::vehicle::Vehicle;

/// A resource chosen by worst-first selection.
#[derive(Debug, Clone)]
pub enum Candidate {
    /// A piece of equipment due for maintenance.
    Target(Arc<MaintenanceTarget>),
    /// A computing node due for tuning.
    Node(Arc<ComputingNode>),
}

impl Candidate {
    /// Display name of the chosen resource.
    pub fn name(&self) -> &str {
        match self {
            Self::Target(target) => target.name(),
            Self::Node(node) => node.name(),
        }
    }
}

/// Every shared facility of one settlement.
#[derive(Debug)]
pub struct Settlement {
    /// Settlement name.
    name: String,
    /// Seated stations.
    stations: Vec<Arc<Station>>,
    /// Maintainable equipment.
    targets: Vec<Arc<MaintenanceTarget>>,
    /// Computing nodes.
    computing: ComputingPool,
    /// Settlement-wide flags by name.
    flags: BTreeMap<String, Arc<SettlementFlag>>,
    /// Vehicles by id.
    vehicles: BTreeMap<VehicleId, Vehicle>,
}

impl Settlement {
    /// Create an empty settlement.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stations: Vec::new(),
            targets: Vec::new(),
            computing: ComputingPool::new(),
            flags: BTreeMap::new(),
            vehicles: BTreeMap::new(),
        }
    }

    /// Settlement name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a station.
    pub fn add_station(&mut self, station: Station) -> Arc<Station> {
        let station = Arc::new(station);
        self.stations.push(Arc::clone(&station));
        station
    }

    /// Register a maintainable piece of equipment.
    pub fn add_target(&mut self, target: MaintenanceTarget) -> Arc<MaintenanceTarget> {
        let target = Arc::new(target);
        self.targets.push(Arc::clone(&target));
        target
    }

    /// Register a computing node.
    pub fn add_node(&mut self, node: ComputingNode) -> Arc<ComputingNode> {
        self.computing.add(node)
    }

    /// Register a settlement-wide flag.
    pub fn add_flag(&mut self, name: impl Into<String>) -> Result<Arc<SettlementFlag>, WorldError> {
        let name = name.into();
        if self.flags.contains_key(&name) {
            return Err(WorldError::DuplicateFlag(name));
        }
        let flag = Arc::new(SettlementFlag::new(name.clone()));
        self.flags.insert(name, Arc::clone(&flag));
        Ok(flag)
    }

    /// Register a vehicle.
    pub fn add_vehicle(&mut self, vehicle: Vehicle) -> VehicleId {
        let id = vehicle.id();
        self.vehicles.insert(id, vehicle);
        id
    }

    /// All stations.
    pub fn stations(&self) -> &[Arc<Station>] {
        &self.stations
    }

    /// All maintainable equipment.
    pub fn targets(&self) -> &[Arc<MaintenanceTarget>] {
        &self.targets
    }

    /// The computing pool.
    pub const fn computing(&self) -> &ComputingPool {
        &self.computing
    }

    /// Look up a flag by name.
    pub fn flag(&self, name: &str) -> Option<&Arc<SettlementFlag>> {
        self.flags.get(name)
    }

    /// Look up a vehicle.
    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    /// Whether the vehicle exists and is parked in a garage.
    pub fn is_in_garage(&self, vehicle: VehicleId) -> bool {
        self.vehicles.get(&vehicle).is_some_and(Vehicle::is_garaged)
    }

    /// Stations of `function`, same zone first.
    fn stations_by_preference(
        &self,
        zone: Option<u32>,
        function: FunctionType,
    ) -> impl Iterator<Item = &Arc<Station>> {
        let local = self
            .stations
            .iter()
            .filter(move |s| s.function() == function && Some(s.zone()) == zone);
        let remote = self
            .stations
            .iter()
            .filter(move |s| s.function() == function && Some(s.zone()) != zone);
        local.chain(remote)
    }

    /// Find a station of `function` with a free seat, preferring `zone`.
    pub fn find_station(&self, zone: Option<u32>, function: FunctionType) -> Option<Arc<Station>> {
        self.stations_by_preference(zone, function)
            .find(|station| station.has_free_seat())
            .cloned()
    }

    /// Find a free desk following the general fallback order
    /// (research, administration, dining, living).
    pub fn find_desk(&self, zone: Option<u32>) -> Option<Arc<Station>> {
        FunctionType::DESK_FALLBACK
            .iter()
            .find_map(|function| self.find_station(zone, *function))
    }

    /// Take a seat for `holder`, trying each function in order.
    ///
    /// Returns `None` when every matching station is full; the caller then
    /// works without a seat.
    pub fn acquire_seat(
        &self,
        holder: AgentId,
        zone: Option<u32>,
        functions: &[FunctionType],
    ) -> Option<SeatLease> {
        for function in functions {
            for station in self.stations_by_preference(zone, *function) {
                if let Some(lease) = station.try_acquire(holder) {
                    return Some(lease);
                }
            }
            debug!(agent = %holder, function = ?function, "no free station, falling back");
        }
        None
    }

    /// Pick the equipment most in need of maintenance, by probability.
    ///
    /// Malfunctioning equipment is picked first so that servicing clears the
    /// fault. Agents outside any building count as zone 0.
    pub fn worst_target<R: Rng + ?Sized>(
        &self,
        zone: Option<u32>,
        any_zone: bool,
        rng: &mut R,
    ) -> Option<Arc<MaintenanceTarget>> {
        let zone = zone.unwrap_or(0);
        let candidates: Vec<&Arc<MaintenanceTarget>> = self
            .targets
            .iter()
            .filter(|t| any_zone || t.zone() == zone)
            .collect();
        select_weighted(&repairs_first(candidates), |t| t.staleness(), rng).map(|t| Arc::clone(t))
    }

    /// Pick the computing node with the most entropy, by probability.
    ///
    /// Malfunctioning nodes are picked first.
    pub fn worst_node<R: Rng + ?Sized>(
        &self,
        zone: Option<u32>,
        any_zone: bool,
        rng: &mut R,
    ) -> Option<Arc<ComputingNode>> {
        let zone = zone.unwrap_or(0);
        let candidates: Vec<&Arc<ComputingNode>> = self
            .computing
            .nodes()
            .iter()
            .filter(|n| any_zone || n.zone() == zone)
            .collect();
        select_weighted(&repairs_first(candidates), |n| n.entropy(), rng).map(|n| Arc::clone(n))
    }

    /// Worst-first selection for any quality-ranked resource kind.
    pub fn find_worst_by_probability<R: Rng + ?Sized>(
        &self,
        zone: Option<u32>,
        kind: ResourceKind,
        any_zone: bool,
        rng: &mut R,
    ) -> Option<Candidate> {
        match kind {
            ResourceKind::MaintenanceTarget => {
                self.worst_target(zone, any_zone, rng).map(Candidate::Target)
            }
            ResourceKind::ComputingNode => self.worst_node(zone, any_zone, rng).map(Candidate::Node),
        }
    }

    /// Advance every facility by `time` millisols.
    pub fn age(&self, time: f64) {
        for target in &self.targets {
            target.age(time);
        }
        self.computing.replenish(time);
    }
}

/// Narrow `candidates` to the malfunctioning ones, if there are any.
fn repairs_first<T: Malfunctionable>(candidates: Vec<&Arc<T>>) -> Vec<&Arc<T>> {
    if candidates.iter().any(|c| c.has_malfunction()) {
        candidates.into_iter().filter(|c| c.has_malfunction()).collect()
    } else {
        candidates
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::lease::Lease;
    use crate::malfunction::Malfunction;
    use crate::selection::SimRng;

    fn settlement() -> Settlement {
        let mut s = Settlement::new("Schiaparelli Point");
        s.add_station(Station::new("Admin A", FunctionType::Administration, 1, 1).unwrap());
        s.add_station(Station::new("Admin B", FunctionType::Administration, 2, 1).unwrap());
        s.add_station(Station::new("Mgmt", FunctionType::Management, 1, 1).unwrap());
        s.add_station(Station::new("Lab", FunctionType::Research, 1, 2).unwrap());
        s
    }

    #[test]
    fn same_zone_station_is_preferred() {
        let s = settlement();
        let lease = s
            .acquire_seat(AgentId::new(), Some(2), &FunctionType::OFFICE_FALLBACK)
            .unwrap();
        assert_eq!(lease.station().name(), "Admin B");
    }

    #[test]
    fn office_fallback_chain_then_degraded() {
        let s = settlement();
        let functions = FunctionType::OFFICE_FALLBACK;
        let a = s.acquire_seat(AgentId::new(), Some(1), &functions).unwrap();
        let b = s.acquire_seat(AgentId::new(), Some(1), &functions).unwrap();
        let c = s.acquire_seat(AgentId::new(), Some(1), &functions).unwrap();
        assert_eq!(a.station().name(), "Admin A");
        assert_eq!(b.station().name(), "Admin B");
        assert_eq!(c.station().name(), "Mgmt");
        assert!(s.acquire_seat(AgentId::new(), Some(1), &functions).is_none());
    }

    #[test]
    fn desk_fallback_starts_with_research() {
        let s = settlement();
        assert_eq!(s.find_desk(Some(1)).unwrap().name(), "Lab");
    }

    #[test]
    fn find_station_skips_full_stations() {
        let s = settlement();
        let mut lease = s
            .acquire_seat(AgentId::new(), Some(1), &[FunctionType::Management])
            .unwrap();
        assert!(s.find_station(Some(1), FunctionType::Management).is_none());
        lease.release();
        assert!(s.find_station(Some(1), FunctionType::Management).is_some());
    }

    #[test]
    fn duplicate_flags_are_rejected() {
        let mut s = settlement();
        assert!(s.add_flag("job review").is_ok());
        assert!(s.add_flag("job review").is_err());
        assert!(s.flag("job review").is_some());
    }

    #[test]
    fn garage_queries() {
        let mut s = settlement();
        let parked = s.add_vehicle(Vehicle::new("Rover 1", true));
        let outside = s.add_vehicle(Vehicle::new("Rover 2", false));
        assert!(s.is_in_garage(parked));
        assert!(!s.is_in_garage(outside));
        assert!(!s.is_in_garage(VehicleId::new()));
    }

    #[test]
    fn worst_target_respects_zone_unless_widened() {
        let mut s = settlement();
        s.add_target(MaintenanceTarget::new("Heater", 1, 0.0).unwrap());
        let far = s.add_target(MaintenanceTarget::new("Antenna", 3, 0.0).unwrap());
        s.age(10.0);
        let mut rng = SimRng::seed_from_u64(11);
        for _ in 0..50 {
            let pick = s.worst_target(Some(1), false, &mut rng).unwrap();
            assert_eq!(pick.name(), "Heater");
        }
        let mut saw_far = false;
        for _ in 0..200 {
            let pick = s.worst_target(Some(1), true, &mut rng).unwrap();
            if Arc::ptr_eq(&pick, &far) {
                saw_far = true;
            }
        }
        assert!(saw_far);
    }

    #[test]
    fn malfunctioning_equipment_is_picked_first() {
        let mut s = settlement();
        s.add_target(MaintenanceTarget::new("Heater", 1, 0.0).unwrap());
        let pump = s.add_target(MaintenanceTarget::new("Pump", 1, 0.0).unwrap());
        s.add_node(ComputingNode::new("Core", 1, 5.0).unwrap());
        let lab = s.add_node(ComputingNode::new("Lab", 1, 5.0).unwrap());
        s.age(10.0);
        // The pump is freshly serviced, so only its fault can make it the pick.
        pump.service(1.0);
        for equipment in [pump.as_ref() as &dyn Malfunctionable, lab.as_ref()] {
            equipment.report_malfunction(Malfunction {
                description: "seized".to_owned(),
                location: None,
                reported_by: None,
                reported_at: None,
            });
        }
        let mut rng = SimRng::seed_from_u64(13);
        for _ in 0..50 {
            assert!(Arc::ptr_eq(&s.worst_target(Some(1), false, &mut rng).unwrap(), &pump));
            assert!(Arc::ptr_eq(&s.worst_node(Some(1), false, &mut rng).unwrap(), &lab));
        }
    }

    #[test]
    fn worst_node_by_kind() {
        let mut s = settlement();
        s.add_node(ComputingNode::new("Core", 0, 5.0).unwrap());
        let mut rng = SimRng::seed_from_u64(12);
        let pick = s
            .find_worst_by_probability(None, ResourceKind::ComputingNode, false, &mut rng)
            .unwrap();
        assert_eq!(pick.name(), "Core");
        assert!(
            s.find_worst_by_probability(None, ResourceKind::MaintenanceTarget, false, &mut rng)
                .is_none()
        );
    }
}
