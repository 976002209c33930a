//! `epi-schedule` — daily activity schedules and schedule templates.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`activity`]  | `Activity`, `ScheduleEntry`, `Schedule`                   |
//! | [`template`]  | `Role`, `ScheduleTemplates`, per-individual jitter        |
//! | [`loader`]    | `load_templates_csv`, `load_templates_reader`             |
//! | [`error`]     | `ScheduleError`, `ScheduleResult<T>`                      |
//!
//! # Day model (summary)
//!
//! Every individual has a `Schedule` repeating each simulated day.  At
//! time-of-day `t`:
//!
//! ```text
//! activity_at(t) = activity of the last entry whose start_secs ≤ t
//!                  (the day's final entry if t precedes the first)
//! ```

pub mod activity;
pub mod error;
pub mod loader;
pub mod template;


pub use activity::{Activity, Schedule, ScheduleEntry};
pub use error::{ScheduleError, ScheduleResult};
pub use loader::{load_templates_csv, load_templates_reader};
pub use template::{Role, ScheduleTemplates, jittered};
