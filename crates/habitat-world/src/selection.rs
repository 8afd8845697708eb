//! Probability-weighted worst-candidate selection.
//!
//! Candidates in worse condition get proportionally larger weights, so they
//! are more likely to be picked without being picked every time. This keeps
//! several agents from converging on the single worst resource in the same
//! tick, and lets better-conditioned resources get attention too.
//!
//! Selection uses cumulative weights: a uniform roll in `[0, total)` walks
//! the running sum until it falls inside a candidate's band.

use rand::Rng;
use rand::rngs::SmallRng;

/// Random number generator threaded through every stochastic call.
pub type SimRng = SmallRng;

/// Default chance that a selection widens to every zone of the settlement.
pub const DEFAULT_ANY_ZONE_PROBABILITY: f64 = 0.05;

/// Pick an index from `items`, weighted by `weight`.
///
/// Non-finite and non-positive weights never win. When no candidate has a
/// positive weight the pick is uniform. Returns `None` for an empty slice.
pub fn weighted_index<T, F, R>(items: &[T], weight: F, rng: &mut R) -> Option<usize>
where
    F: Fn(&T) -> f64,
    R: Rng + ?Sized,
{
    if items.is_empty() {
        return None;
    }

    let weights: Vec<f64> = items
        .iter()
        .map(|item| {
            let w = weight(item);
            if w.is_finite() && w > 0.0 { w } else { 0.0 }
        })
        .collect();
    let total: f64 = weights.iter().sum();

    if total <= 0.0 {
        return Some(rng.random_range(0..items.len()));
    }

    let roll = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (index, w) in weights.iter().enumerate() {
        if *w <= 0.0 {
            continue;
        }
        cumulative += w;
        last_positive = Some(index);
        if roll < cumulative {
            return Some(index);
        }
    }
    // Rounding can leave the roll a hair past the final band.
    last_positive
}

/// Pick a reference from `items`, weighted by `weight`.
pub fn select_weighted<'a, T, F, R>(items: &'a [T], weight: F, rng: &mut R) -> Option<&'a T>
where
    F: Fn(&T) -> f64,
    R: Rng + ?Sized,
{
    weighted_index(items, weight, rng).and_then(|index| items.get(index))
}

/// Roll whether this selection should ignore zone boundaries.
pub fn roll_any_zone<R: Rng + ?Sized>(probability: f64, rng: &mut R) -> bool {
    if !probability.is_finite() || probability <= 0.0 {
        return false;
    }
    rng.random::<f64>() < probability
}
