//! Mars clock for the Habitat simulation.
//!
//! The clock is the single source of truth for simulated time. It counts
//! total millisols since the mission started and derives everything else
//! (sol, millisol of sol, Earth timestamp) from that count.
//!
//! # Design Principles
//!
//! - Time only moves forward, in positive finite pulses.
//! - Sol and millisol are computed from the running total, never stored.
//! - The tick counter uses checked arithmetic.

use chrono::{DateTime, TimeDelta, Utc};
use habitat_types::{MILLISOLS_PER_SOL, MarsTime};
use serde::Serialize;

use crate::config::ClockConfig;

/// Earth seconds in one millisol.
pub const SECONDS_PER_MILLISOL: f64 = 88.775_244;

/// Earth timestamp of mission sol 1, millisol 0 (Unix seconds).
const MISSION_EPOCH_SECONDS: i64 = 1_861_920_000;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// A pulse was zero, negative or non-finite.
    #[error("invalid clock pulse: {pulse}")]
    InvalidPulse {
        /// The rejected pulse in millisols.
        pulse: f64,
    },

    /// Invalid clock configuration.
    #[error("invalid clock configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// What one call to [`MarsClock::advance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClockPulse {
    /// Tick number after the advance.
    pub tick: u64,
    /// Millisols that passed.
    pub elapsed: f64,
    /// Time after the advance.
    pub time: MarsTime,
    /// Whether a new sol started during this pulse.
    pub new_sol: bool,
}

/// Simulated mission clock.
#[derive(Debug, Clone, PartialEq)]
pub struct MarsClock {
    /// Millisols since sol 1, millisol 0.
    total_millisols: f64,
    /// Pulses taken so far.
    tick: u64,
}

impl MarsClock {
    /// Create a clock at the configured start sol and millisol.
    pub fn new(config: &ClockConfig) -> Result<Self, ClockError> {
        if config.start_sol == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "start_sol must be at least 1".to_owned(),
            });
        }
        if !config.start_millisol.is_finite()
            || config.start_millisol < 0.0
            || config.start_millisol >= MILLISOLS_PER_SOL
        {
            return Err(ClockError::InvalidConfig {
                reason: format!("start_millisol {} out of [0, 1000)", config.start_millisol),
            });
        }
        let sols_elapsed = f64::from(config.start_sol.saturating_sub(1));
        Ok(Self {
            total_millisols: sols_elapsed.mul_add(MILLISOLS_PER_SOL, config.start_millisol),
            tick: 0,
        })
    }

    /// Create a clock at an explicit time (useful for testing).
    pub fn at(time: MarsTime) -> Self {
        let sols_elapsed = f64::from(time.sol.saturating_sub(1));
        Self {
            total_millisols: sols_elapsed.mul_add(MILLISOLS_PER_SOL, time.millisol),
            tick: 0,
        }
    }

    /// Advance the clock by `pulse` millisols.
    pub fn advance(&mut self, pulse: f64) -> Result<ClockPulse, ClockError> {
        if !pulse.is_finite() || pulse <= 0.0 {
            return Err(ClockError::InvalidPulse { pulse });
        }
        let before = self.current_time();
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        self.total_millisols += pulse;
        let time = self.current_time();
        Ok(ClockPulse {
            tick: self.tick,
            elapsed: pulse,
            time,
            new_sol: time.sol != before.sol,
        })
    }

    /// Current simulated time.
    pub fn current_time(&self) -> MarsTime {
        MarsTime::new(1, self.total_millisols)
    }

    /// Whole millisol of `time` within its sol.
    pub fn millisol_of(time: MarsTime) -> u32 {
        time.millisol_int()
    }

    /// Pulses taken so far.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Millisols since the mission started.
    pub const fn total_millisols(&self) -> f64 {
        self.total_millisols
    }

    /// Earth timestamp corresponding to the current simulated time.
    #[allow(clippy::cast_possible_truncation)]
    pub fn earth_time(&self) -> DateTime<Utc> {
        let epoch = DateTime::from_timestamp(MISSION_EPOCH_SECONDS, 0).unwrap_or(DateTime::UNIX_EPOCH);
        // Bounded well inside i64 for any clock that fits in a u32 sol count.
        let millis = (self.total_millisols * SECONDS_PER_MILLISOL * 1000.0)
            .round()
            .clamp(0.0, 1.0e15) as i64;
        epoch
            .checked_add_signed(TimeDelta::milliseconds(millis))
            .unwrap_or(epoch)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn clock() -> MarsClock {
        MarsClock::new(&ClockConfig::default()).unwrap()
    }

    #[test]
    fn starts_at_configured_time() {
        let config = ClockConfig {
            start_sol: 3,
            start_millisol: 250.0,
            ..ClockConfig::default()
        };
        let clock = MarsClock::new(&config).unwrap();
        let now = clock.current_time();
        assert_eq!(now.sol, 3);
        assert_eq!(MarsClock::millisol_of(now), 250);
        assert_eq!(clock.tick(), 0);
    }

    #[test]
    fn rejects_bad_config() {
        let config = ClockConfig {
            start_sol: 0,
            ..ClockConfig::default()
        };
        assert!(MarsClock::new(&config).is_err());
        let config = ClockConfig {
            start_millisol: 1000.0,
            ..ClockConfig::default()
        };
        assert!(MarsClock::new(&config).is_err());
    }

    #[test]
    fn advance_reports_sol_rollover() {
        let mut clock = MarsClock::at(MarsTime::new(1, 990.0));
        let pulse = clock.advance(5.0).unwrap();
        assert!(!pulse.new_sol);
        assert_eq!(pulse.tick, 1);
        let pulse = clock.advance(10.0).unwrap();
        assert!(pulse.new_sol);
        assert_eq!(pulse.time.sol, 2);
        assert_eq!(pulse.time.millisol_int(), 5);
    }

    #[test]
    fn rejects_bad_pulses() {
        let mut clock = clock();
        assert!(matches!(clock.advance(0.0), Err(ClockError::InvalidPulse { .. })));
        assert!(clock.advance(-1.0).is_err());
        assert!(clock.advance(f64::NAN).is_err());
        assert_eq!(clock.tick(), 0);
    }

    #[test]
    fn earth_time_moves_with_mars_time() {
        let mut clock = MarsClock::at(MarsTime::new(1, 0.0));
        let start = clock.earth_time();
        clock.advance(1000.0).unwrap();
        let elapsed = clock.earth_time() - start;
        // One sol is 24h 39m 35s.
        assert_eq!(elapsed.num_seconds(), 88_775);
    }
}
