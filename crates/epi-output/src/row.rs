//! Plain data row types written by output backends.

use epi_core::{HealthState, Timestamp};

/// One individual at one instant, as drawn on the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSnapshotRow {
    pub agent_id:  u32,
    pub timestamp: Timestamp,
    pub x:         f64,
    pub y:         f64,
    pub health:    HealthState,
    /// Activity label (`SLEEP`, `WORK`, ...).
    pub activity:  &'static str,
}
