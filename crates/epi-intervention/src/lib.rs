//! `epi-intervention` — time-scheduled public-health interventions.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`param`]     | `InterventionKind`, `InterventionParam` + validation     |
//! | [`policy`]    | `ActivePolicies` and the per-kind typed policies         |
//! | [`scheduler`] | `Interventions` (two-heap scheduler), `InterventionChanges` |
//! | [`error`]     | `InterventionError`, `InterventionResult<T>`             |
//!
//! # Usage
//!
//! ```ignore
//! let mut iv = Interventions::new(config.interventions.clone())?;
//! iv.step(0, &mut env);
//! // each day rollover:
//! iv.step(day, &mut env);
//! if let Some(masks) = iv.policies().masks { /* ... */ }
//! ```

pub mod error;
pub mod param;
pub mod policy;
pub mod scheduler;

#[cfg(test)]
mod tests;

pub use error::{InterventionError, InterventionResult};
pub use param::{InterventionKind, InterventionParam};
pub use policy::{
    ActivePolicies, DistancingPolicy, LockdownPolicy, MaskPolicy, TestingPolicy, TracingPolicy,
    VaccinationPolicy,
};
pub use scheduler::{InterventionChanges, Interventions};
