//! CSV schedule-template loader.
//!
//! # CSV format
//!
//! One row per schedule entry.  Rows for the same template may appear in any
//! order; they are sorted on construction.
//!
//! ```csv
//! template,start_secs,activity
//! worker,0,SLEEP
//! worker,25200,WORK
//! worker,61200,LEISURE
//! worker,79200,SLEEP
//! retired,0,SLEEP
//! retired,36000,LEISURE
//! ```
//!
//! **`template`** is one of `worker`, `student`, `retired`.  Templates absent
//! from the file keep their defaults, so a file may override a single role.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::activity::{Activity, Schedule, ScheduleEntry};
use crate::template::{Role, ScheduleTemplates};
use crate::ScheduleError;

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TemplateRecord {
    template:   String,
    start_secs: u32,
    activity:   Activity,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load schedule templates from a CSV file.
pub fn load_templates_csv(path: &Path) -> Result<ScheduleTemplates, ScheduleError> {
    let file = std::fs::File::open(path).map_err(ScheduleError::Io)?;
    load_templates_reader(file)
}

/// Like [`load_templates_csv`] but accepts any `Read` source.
pub fn load_templates_reader<R: Read>(reader: R) -> Result<ScheduleTemplates, ScheduleError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut by_role: BTreeMap<Role, Vec<ScheduleEntry>> = BTreeMap::new();

    for result in csv_reader.deserialize::<TemplateRecord>() {
        let row = result.map_err(|e| ScheduleError::Parse(e.to_string()))?;
        let role: Role = row.template.parse()?;
        by_role.entry(role).or_default().push(ScheduleEntry::new(row.start_secs, row.activity));
    }

    let mut templates = ScheduleTemplates::default();
    for (role, entries) in by_role {
        *templates.get_mut(role) = Schedule::new(entries)?;
    }
    Ok(templates)
}
