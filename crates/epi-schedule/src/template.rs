//! Schedule templates by population role.
//!
//! Population generation gives every individual a copy of the template for
//! its role, shifted by a per-individual jitter so that not everybody leaves
//! home on the same tick.  The shift moves every entry after midnight by the
//! same offset, which keeps the entry order and the length of each block.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use epi_core::{AgentRng, DAY_SECS};

use crate::activity::{Activity, Schedule, ScheduleEntry};
use crate::{ScheduleError, ScheduleResult};

/// Which template an individual follows.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Worker,
    Student,
    Retired,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Worker, Role::Student, Role::Retired];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Worker  => "worker",
            Role::Student => "student",
            Role::Retired => "retired",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ScheduleError;
    fn from_str(s: &str) -> ScheduleResult<Self> {
        match s.trim() {
            "worker"  => Ok(Role::Worker),
            "student" => Ok(Role::Student),
            "retired" => Ok(Role::Retired),
            other     => Err(ScheduleError::UnknownTemplate(other.to_owned())),
        }
    }
}

/// One schedule per [`Role`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleTemplates {
    pub worker:  Schedule,
    pub student: Schedule,
    pub retired: Schedule,
}

impl Default for ScheduleTemplates {
    fn default() -> Self {
        use Activity::*;
        let build = |entries: Vec<ScheduleEntry>| Schedule { entries };
        Self {
            worker: build(vec![
                ScheduleEntry::at_hour(0, Sleep),
                ScheduleEntry::at_hour(8, Work),
                ScheduleEntry::at_hour(17, Leisure),
                ScheduleEntry::at_hour(22, Sleep),
            ]),
            student: build(vec![
                ScheduleEntry::at_hour(0, Sleep),
                ScheduleEntry::at_hour(8, Work),
                ScheduleEntry::at_hour(15, Leisure),
                ScheduleEntry::at_hour(20, Sleep),
            ]),
            retired: build(vec![
                ScheduleEntry::at_hour(0, Sleep),
                ScheduleEntry::at_hour(9, Leisure),
                ScheduleEntry::at_hour(12, Sleep),
                ScheduleEntry::at_hour(15, Leisure),
                ScheduleEntry::at_hour(19, Sleep),
            ]),
        }
    }
}

impl ScheduleTemplates {
    pub fn get(&self, role: Role) -> &Schedule {
        match role {
            Role::Worker  => &self.worker,
            Role::Student => &self.student,
            Role::Retired => &self.retired,
        }
    }

    pub fn get_mut(&mut self, role: Role) -> &mut Schedule {
        match role {
            Role::Worker  => &mut self.worker,
            Role::Student => &mut self.student,
            Role::Retired => &mut self.retired,
        }
    }

    /// The template for `role`, shifted by a uniform offset in
    /// `[-jitter_secs, jitter_secs]`.
    pub fn instantiate(&self, role: Role, jitter_secs: u32, rng: &mut AgentRng) -> Schedule {
        jittered(self.get(role), jitter_secs, rng)
    }
}

/// Shift every entry after midnight by the same random offset, clamped so the
/// entries stay inside `(0, DAY_SECS)`.
pub fn jittered(template: &Schedule, jitter_secs: u32, rng: &mut AgentRng) -> Schedule {
    if jitter_secs == 0 {
        return template.clone();
    }
    let movable: Vec<u32> = template
        .entries()
        .iter()
        .map(|e| e.start_secs)
        .filter(|&s| s > 0)
        .collect();
    let (Some(&first), Some(&last)) = (movable.first(), movable.last()) else {
        return template.clone();
    };

    let j = jitter_secs as i64;
    let lo = (1 - first as i64).max(-j);
    let hi = (DAY_SECS as i64 - 1 - last as i64).min(j);
    let offset = if lo < hi { rng.gen_range(lo..=hi) } else { 0 };

    let entries = template
        .entries()
        .iter()
        .map(|e| {
            if e.start_secs == 0 {
                *e
            } else {
                ScheduleEntry::new((e.start_secs as i64 + offset) as u32, e.activity)
            }
        })
        .collect();
    // Order is preserved by a uniform shift.
    Schedule { entries }
}
