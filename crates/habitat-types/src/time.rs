//! Mars calendar timestamps.
//!
//! The simulation measures time in millisols (one thousandth of a Martian
//! solar day). [`MarsTime`] is the value the clock adapter hands to tasks;
//! it carries the mission sol and the fractional millisol within that sol.

use serde::{Deserialize, Serialize};

/// Number of millisols in one sol.
pub const MILLISOLS_PER_SOL: f64 = 1000.0;

/// A point in simulated time.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct MarsTime {
    /// Mission sol, starting at 1.
    pub sol: u32,
    /// Millisols elapsed within the sol, in `[0, 1000)`.
    pub millisol: f64,
}

impl MarsTime {
    /// Create a timestamp, folding any millisol overflow into whole sols.
    ///
    /// Non-finite or negative millisols are treated as the start of the sol.
    pub fn new(sol: u32, millisol: f64) -> Self {
        if !millisol.is_finite() || millisol < 0.0 {
            return Self { sol, millisol: 0.0 };
        }
        let extra_sols = (millisol / MILLISOLS_PER_SOL).floor();
        let millisol = millisol - extra_sols * MILLISOLS_PER_SOL;
        let extra = float_to_u32(extra_sols);
        Self {
            sol: sol.saturating_add(extra),
            millisol,
        }
    }

    /// Whole millisol of the sol (the integer part of [`Self::millisol`]).
    pub fn millisol_int(self) -> u32 {
        float_to_u32(self.millisol.floor())
    }

    /// True when the timestamp lies in the given half-open millisol window.
    ///
    /// Windows that wrap past midnight (`start > end`) are supported.
    pub fn is_within(self, start: f64, end: f64) -> bool {
        if start <= end {
            self.millisol >= start && self.millisol < end
        } else {
            self.millisol >= start || self.millisol < end
        }
    }
}

impl core::fmt::Display for MarsTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "sol {} {:07.3}", self.sol, self.millisol)
    }
}

/// Saturating float to `u32` conversion for already-floored values.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn float_to_u32(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        0
    } else if value >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        value as u32
    }
}
