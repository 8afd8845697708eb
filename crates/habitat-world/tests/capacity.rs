//! Seat capacity invariants under randomized and concurrent contention.
//!
//! Every station must keep `0 <= current_holders <= capacity` no matter how
//! acquires and releases from many agents interleave.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use habitat_types::{AgentId, FunctionType};
use habitat_world::{Lease, SeatLease, Station};
use proptest::prelude::*;

/// One step of a simulated contention sequence.
#[derive(Debug, Clone)]
enum Op {
    /// Agent `n` tries to sit down.
    Acquire(usize),
    /// Agent `n` stands up (may already be standing).
    Release(usize),
}

fn op_strategy(agents: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..agents).prop_map(Op::Acquire),
        (0..agents).prop_map(Op::Release),
    ]
}

proptest! {
    #[test]
    fn holders_never_exceed_capacity(
        capacity in 1_u32..5,
        ops in prop::collection::vec(op_strategy(8), 1..200),
    ) {
        let station = Arc::new(
            Station::new("Office", FunctionType::Administration, 1, capacity).unwrap(),
        );
        let agents: Vec<AgentId> = (0..8).map(|_| AgentId::new()).collect();
        let mut seats: Vec<Option<SeatLease>> = (0..8).map(|_| None).collect();

        for op in ops {
            match op {
                Op::Acquire(n) => {
                    if let (Some(slot), Some(agent)) = (seats.get_mut(n), agents.get(n)) {
                        if slot.is_none() {
                            *slot = station.try_acquire(*agent);
                        }
                    }
                }
                Op::Release(n) => {
                    if let Some(Some(lease)) = seats.get_mut(n) {
                        lease.release();
                    }
                    if let Some(slot) = seats.get_mut(n) {
                        *slot = None;
                    }
                }
            }
            let held = seats
                .iter()
                .filter(|s| s.as_ref().is_some_and(|l| !l.is_released()))
                .count();
            prop_assert!(station.current_holders() <= capacity);
            prop_assert_eq!(station.current_holders() as usize, held);
        }

        drop(seats);
        prop_assert_eq!(station.current_holders(), 0);
    }
}

#[test]
fn concurrent_agents_never_overfill_a_station() {
    let station = Arc::new(Station::new("Office", FunctionType::Administration, 1, 3).unwrap());

    std::thread::scope(|scope| {
        for _ in 0..16 {
            let station = Arc::clone(&station);
            scope.spawn(move || {
                let agent = AgentId::new();
                for _ in 0..500 {
                    if let Some(mut lease) = station.try_acquire(agent) {
                        assert!(station.current_holders() <= station.capacity());
                        lease.release();
                    }
                }
            });
        }
    });

    assert_eq!(station.current_holders(), 0);
}

#[test]
fn single_seat_contention_then_handover() {
    let station = Arc::new(Station::new("Office", FunctionType::Administration, 1, 1).unwrap());
    let mut first = station.try_acquire(AgentId::new()).unwrap();
    assert!(station.try_acquire(AgentId::new()).is_none());
    first.release();
    assert!(station.try_acquire(AgentId::new()).is_some());
}
