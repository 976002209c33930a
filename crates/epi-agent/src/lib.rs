//! `epi-agent` — the individuals of the simulation.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`individual`] | `Individual`, `Compliance`, `MovementConfig`, per-tick `StepContext` / `MovementEvents`, `AgentSnapshot` |
//! | [`population`] | `Population` (arena + per-agent RNGs), `PopulationConfig`, generation |
//! | [`error`]      | `AgentError`, `AgentResult<T>`                             |
//!
//! # Storage
//!
//! Individuals live in a `Vec` indexed by `AgentId`; their movement RNGs live
//! in a parallel `Vec<AgentRng>` so one individual and its own RNG can be
//! borrowed mutably at the same time.  Buildings are referenced by
//! `BuildingId` only; all occupancy lives in the `Environment`.
//!
//! # Tick
//!
//! ```ignore
//! let ctx = StepContext { now, tick_secs, policies: interventions.policies() };
//! let events = population.step(&mut env, &ctx);
//! for (agent, hospital) in &events.admissions { /* count admissions */ }
//! ```

pub mod error;
pub mod individual;
pub mod population;

#[cfg(test)]
mod tests;

pub use error::{AgentError, AgentResult};
pub use individual::{
    AgentSnapshot, Compliance, Individual, MovementConfig, MovementEvents, StepContext,
};
pub use population::{Population, PopulationConfig};
