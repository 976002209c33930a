//! `epi-core` — foundational types for the epidemic simulator.
//!
//! This crate is a dependency of every other `epi-*` crate.  It has no
//! `epi-*` dependencies and minimal external ones (`rand`, `thiserror`,
//! `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `NodeId`, `BuildingId`, `ComponentId`      |
//! | [`geo`]         | `Point`, `Polygon`, `CoordKey`                        |
//! | [`time`]        | `Timestamp`, `SimClock`, `DAY_SECS`                   |
//! | [`rng`]         | `AgentRng` (per-agent), `SimRng` (global streams)     |
//! | [`health`]      | `HealthState` compartments                            |
//! | [`error`]       | `CoreError`, `CoreResult`                             |

pub mod error;
pub mod geo;
pub mod health;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::{CoordKey, Point, Polygon};
pub use health::HealthState;
pub use ids::{AgentId, BuildingId, ComponentId, NodeId};
pub use rng::{AgentRng, SimRng, stream};
pub use time::{DAY_SECS, SimClock, Timestamp};
