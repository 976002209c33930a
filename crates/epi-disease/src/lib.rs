//! `epi-disease` — the epidemiological model.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                |
//! |------------------|---------------------------------------------------------|
//! | [`config`]       | `DiseaseConfig` (rates per day), `tick_probability`     |
//! | [`transmission`] | `RiskFactors`, `VaccineEffect`, `combined_transmission_probability` |
//! | [`contacts`]     | `ContactLog` for contact tracing                        |
//! | [`disease`]      | `Disease` (per-tick pass, seeding), `DiseaseReport`     |
//! | [`error`]        | `DiseaseError`, `DiseaseResult<T>`                      |
//!
//! # Transitions
//!
//! ```text
//! SUSCEPTIBLE ──contact──▶ EXPOSED ──incubation──▶ INFECTIOUS ──onset──┬▶ ASYMPTOMATIC ──────────▶ RECOVERED
//!                                                                      └▶ SYMPTOMATIC_MILD ─┬────▶ RECOVERED
//!                                                                                           └▶ SYMPTOMATIC_SEVERE ─┬▶ RECOVERED
//!                                                                                                                  └▶ DECEASED
//! ```
//!
//! Contacts are co-occupants of the same building room after movement.

pub mod config;
pub mod contacts;
pub mod disease;
pub mod error;
pub mod transmission;


pub use config::{DiseaseConfig, tick_probability};
pub use contacts::ContactLog;
pub use disease::{Disease, DiseaseReport};
pub use error::{DiseaseError, DiseaseResult};
pub use transmission::{RiskFactors, VaccineEffect, combined_transmission_probability};
