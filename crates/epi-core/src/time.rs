//! Simulation time model.
//!
//! # Design
//!
//! Simulated time is a day counter plus a time-of-day in whole seconds.  Each
//! tick advances time-of-day by a fixed step; when it reaches one day it
//! wraps and the day counter increments.  The externally visible key for every
//! output record is the [`Timestamp`]:
//!
//!   timestamp = day * DAY_SECS + time_of_day
//!
//! Integer seconds keep schedule arithmetic exact (no floating-point drift).
//! The tick length must divide a day so every day has the same number of
//! ticks.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Seconds in one simulated day.
pub const DAY_SECS: u32 = 86_400;

// ── Timestamp ────────────────────────────────────────────────────────────────

/// Absolute simulated seconds since day 0, 00:00.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    pub fn from_day_time(day: u32, time_of_day: u32) -> Self {
        Timestamp(day as u64 * DAY_SECS as u64 + time_of_day as u64)
    }

    #[inline]
    pub fn day(self) -> u32 {
        (self.0 / DAY_SECS as u64) as u32
    }

    #[inline]
    pub fn time_of_day(self) -> u32 {
        (self.0 % DAY_SECS as u64) as u32
    }

    /// The timestamp `secs` seconds later.
    #[inline]
    pub fn plus_secs(self, secs: u64) -> Timestamp {
        Timestamp(self.0 + secs)
    }

    /// Whole seconds elapsed from `earlier` to `self` (zero if `earlier` is
    /// later).
    #[inline]
    pub fn since(self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tod = self.time_of_day();
        write!(f, "day {} {:02}:{:02}", self.day(), tod / 3_600, (tod % 3_600) / 60)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Day counter plus time-of-day, advanced one fixed tick at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimClock {
    /// Seconds per tick.
    pub tick_secs: u32,
    /// Completed days since the start.
    pub day: u32,
    /// Seconds since midnight of `day`.
    pub time_of_day: u32,
}

impl SimClock {
    /// A clock at day 0, 00:00.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidTickLength`] unless `0 < tick_secs` and
    /// `tick_secs` divides [`DAY_SECS`].
    pub fn new(tick_secs: u32) -> CoreResult<Self> {
        if tick_secs == 0 || DAY_SECS % tick_secs != 0 {
            return Err(CoreError::InvalidTickLength(tick_secs));
        }
        Ok(Self { tick_secs, day: 0, time_of_day: 0 })
    }

    /// Advance by one tick.  Returns `true` when the day rolled over.
    #[inline]
    pub fn advance(&mut self) -> bool {
        self.time_of_day += self.tick_secs;
        if self.time_of_day >= DAY_SECS {
            self.time_of_day -= DAY_SECS;
            self.day += 1;
            true
        } else {
            false
        }
    }

    /// Back to day 0, 00:00.
    pub fn reset(&mut self) {
        self.day = 0;
        self.time_of_day = 0;
    }

    #[inline]
    pub fn now(&self) -> Timestamp {
        Timestamp::from_day_time(self.day, self.time_of_day)
    }

    pub fn ticks_per_day(&self) -> u32 {
        DAY_SECS / self.tick_secs
    }

    /// Tick length as a fraction of a day; rates per day are scaled by this.
    #[inline]
    pub fn tick_days(&self) -> f64 {
        self.tick_secs as f64 / DAY_SECS as f64
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.now())
    }
}
