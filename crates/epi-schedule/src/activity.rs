//! Core schedule types: `Activity`, `ScheduleEntry`, and `Schedule`.
//!
//! # Day model
//!
//! A schedule is one simulated day of entries, each the second-of-day at
//! which an activity begins.  At time-of-day `t` the active entry is the one
//! with the largest `start_secs` ≤ `t`.  If `t` falls before the first entry
//! (a schedule that does not start at midnight), the last entry of the
//! previous day is still active.
//!
//! Only [`Activity::Sleep`], [`Activity::Work`] and [`Activity::Leisure`]
//! can be scheduled.  Isolation and hospitalisation are imposed on an
//! individual by its health state, never by the clock.

use std::fmt;

use serde::{Deserialize, Serialize};

use epi_core::DAY_SECS;

use crate::{ScheduleError, ScheduleResult};

// ── Activity ──────────────────────────────────────────────────────────────────

/// What an individual is currently doing.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Activity {
    /// At home.
    #[default]
    Sleep,
    /// At the workplace, school or university.
    Work,
    /// At one of the individual's amenities.
    Leisure,
    /// At home because of a positive test, a trace, or a refused admission.
    Isolation,
    /// In a hospital bed.
    Hospitalisation,
}

impl Activity {
    pub const COUNT: usize = 5;

    pub const ALL: [Activity; Self::COUNT] = [
        Activity::Sleep,
        Activity::Work,
        Activity::Leisure,
        Activity::Isolation,
        Activity::Hospitalisation,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// `true` for activities a schedule may contain.
    pub fn is_schedulable(self) -> bool {
        matches!(self, Activity::Sleep | Activity::Work | Activity::Leisure)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Activity::Sleep           => "SLEEP",
            Activity::Work            => "WORK",
            Activity::Leisure         => "LEISURE",
            Activity::Isolation       => "ISOLATION",
            Activity::Hospitalisation => "HOSPITALISATION",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ScheduleEntry ─────────────────────────────────────────────────────────────

/// One entry in a daily schedule.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Second of the day at which the activity begins.
    pub start_secs: u32,
    pub activity:   Activity,
}

impl ScheduleEntry {
    pub const fn new(start_secs: u32, activity: Activity) -> Self {
        Self { start_secs, activity }
    }

    /// Entry starting at `hour:00`.
    pub const fn at_hour(hour: u32, activity: Activity) -> Self {
        Self { start_secs: hour * 3_600, activity }
    }
}

// ── Schedule ──────────────────────────────────────────────────────────────────

/// A repeating daily schedule for one individual.
///
/// Entries are stored sorted by `start_secs` so lookups are O(log n) binary
/// searches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ScheduleEntry>", into = "Vec<ScheduleEntry>")]
pub struct Schedule {
    pub(crate) entries: Vec<ScheduleEntry>,
}

impl Schedule {
    /// Validate and sort `entries`.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::Empty`] for no entries,
    /// [`ScheduleError::NotSchedulable`] for isolation or hospitalisation,
    /// [`ScheduleError::InvalidEntry`] for starts outside the day or two
    /// entries starting at the same second.
    pub fn new(mut entries: Vec<ScheduleEntry>) -> ScheduleResult<Self> {
        if entries.is_empty() {
            return Err(ScheduleError::Empty);
        }
        for e in &entries {
            if !e.activity.is_schedulable() {
                return Err(ScheduleError::NotSchedulable(e.activity));
            }
            if e.start_secs >= DAY_SECS {
                return Err(ScheduleError::InvalidEntry {
                    start_secs: e.start_secs,
                    reason:     format!("must be below {DAY_SECS}"),
                });
            }
        }
        entries.sort_unstable_by_key(|e| e.start_secs);
        if let Some(w) = entries.windows(2).find(|w| w[0].start_secs == w[1].start_secs) {
            return Err(ScheduleError::InvalidEntry {
                start_secs: w[0].start_secs,
                reason:     "duplicate start".into(),
            });
        }
        Ok(Self { entries })
    }

    /// A schedule that does `activity` all day.
    pub fn constant(activity: Activity) -> ScheduleResult<Self> {
        Self::new(vec![ScheduleEntry::new(0, activity)])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read-only slice of all entries (sorted by start).
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// The scheduled activity at `time_of_day` (seconds since midnight).
    pub fn activity_at(&self, time_of_day: u32) -> Activity {
        self.entries[self.entry_idx_at(time_of_day % DAY_SECS)].activity
    }

    fn entry_idx_at(&self, tod: u32) -> usize {
        // First entry whose start is after `tod`.
        let idx = self.entries.partition_point(|e| e.start_secs <= tod);
        if idx == 0 {
            // Still in the last entry of the previous day.
            self.entries.len() - 1
        } else {
            idx - 1
        }
    }
}

impl TryFrom<Vec<ScheduleEntry>> for Schedule {
    type Error = ScheduleError;
    fn try_from(entries: Vec<ScheduleEntry>) -> ScheduleResult<Self> {
        Schedule::new(entries)
    }
}

impl From<Schedule> for Vec<ScheduleEntry> {
    fn from(s: Schedule) -> Self {
        s.entries
    }
}
