//! Intervention kinds and their configured parameters.
//!
//! An [`InterventionParam`] is plain configuration: a kind, a day window, and
//! named float sub-parameters.  Every kind has a fixed table of recognised
//! names with a default and an allowed range; unknown names and out-of-range
//! values are rejected by [`InterventionParam::validate`].
//!
//! | Kind                 | Parameters (default)                                        |
//! |----------------------|-------------------------------------------------------------|
//! | `MASKS`              | `incoming` (0.5), `outgoing` (0.7), `compliance` (0.8)      |
//! | `SOCIAL_DISTANCING`  | `reduction` (0.3), `compliance` (0.7)                       |
//! | `TESTING`            | `wait_days` (2), `test_rate` (0.5), `false_negative` (0.1), `quarantine_days` (14) |
//! | `CONTACT_TRACING`    | `window_days` (3), `compliance` (0.7)                       |
//! | `*_CLOSURE`          | `fraction` (1.0)                                            |
//! | `LOCKDOWN`           | `compliance` (0.8), `leisure_travel` (0.1)                  |
//! | `VACCINATION`        | `doses_per_day` (50), `compliance` (0.8), `max_doses` (2), `interval_days` (21), `susceptibility_reduction` (0.6), `severity_reduction` (0.8) |

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use epi_spatial::BuildingCategory;

use crate::{InterventionError, InterventionResult};

// ── InterventionKind ──────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterventionKind {
    Masks,
    SocialDistancing,
    Testing,
    ContactTracing,
    SchoolClosure,
    UniversityClosure,
    WorkplaceClosure,
    Lockdown,
    Vaccination,
}

/// `(name, default, min, max)`.
type ParamSpec = (&'static str, f64, f64, f64);

const UNIT: f64 = 1.0;
const UNBOUNDED: f64 = f64::INFINITY;

impl InterventionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InterventionKind::Masks             => "MASKS",
            InterventionKind::SocialDistancing  => "SOCIAL_DISTANCING",
            InterventionKind::Testing           => "TESTING",
            InterventionKind::ContactTracing    => "CONTACT_TRACING",
            InterventionKind::SchoolClosure     => "SCHOOL_CLOSURE",
            InterventionKind::UniversityClosure => "UNIVERSITY_CLOSURE",
            InterventionKind::WorkplaceClosure  => "WORKPLACE_CLOSURE",
            InterventionKind::Lockdown          => "LOCKDOWN",
            InterventionKind::Vaccination       => "VACCINATION",
        }
    }

    /// The building category a closure-type intervention closes.
    pub fn closes(self) -> Option<BuildingCategory> {
        match self {
            InterventionKind::SchoolClosure     => Some(BuildingCategory::School),
            InterventionKind::UniversityClosure => Some(BuildingCategory::University),
            InterventionKind::WorkplaceClosure  => Some(BuildingCategory::NonEssentialWorkplace),
            _ => None,
        }
    }

    fn param_specs(self) -> &'static [ParamSpec] {
        match self {
            InterventionKind::Masks => &[
                ("incoming",   0.5, 0.0, UNIT),
                ("outgoing",   0.7, 0.0, UNIT),
                ("compliance", 0.8, 0.0, UNIT),
            ],
            InterventionKind::SocialDistancing => &[
                ("reduction",  0.3, 0.0, UNIT),
                ("compliance", 0.7, 0.0, UNIT),
            ],
            InterventionKind::Testing => &[
                ("wait_days",       2.0,  0.0, UNBOUNDED),
                ("test_rate",       0.5,  0.0, UNBOUNDED),
                ("false_negative",  0.1,  0.0, UNIT),
                ("quarantine_days", 14.0, 0.0, UNBOUNDED),
            ],
            InterventionKind::ContactTracing => &[
                ("window_days", 3.0, 0.0, UNBOUNDED),
                ("compliance",  0.7, 0.0, UNIT),
            ],
            InterventionKind::SchoolClosure
            | InterventionKind::UniversityClosure
            | InterventionKind::WorkplaceClosure => &[("fraction", 1.0, 0.0, UNIT)],
            InterventionKind::Lockdown => &[
                ("compliance",     0.8, 0.0, UNIT),
                ("leisure_travel", 0.1, 0.0, UNIT),
            ],
            InterventionKind::Vaccination => &[
                ("doses_per_day",            50.0, 0.0, UNBOUNDED),
                ("compliance",               0.8,  0.0, UNIT),
                ("max_doses",                2.0,  1.0, UNBOUNDED),
                ("interval_days",            21.0, 0.0, UNBOUNDED),
                ("susceptibility_reduction", 0.6,  0.0, UNIT),
                ("severity_reduction",       0.8,  0.0, UNIT),
            ],
        }
    }

    /// Default value of parameter `name`, `None` if the kind has no such
    /// parameter.
    pub fn default_param(self, name: &str) -> Option<f64> {
        self.param_specs().iter().find(|s| s.0 == name).map(|s| s.1)
    }

    /// Names this kind accepts.
    pub fn param_names(self) -> impl Iterator<Item = &'static str> {
        self.param_specs().iter().map(|s| s.0)
    }
}

impl fmt::Display for InterventionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── InterventionParam ─────────────────────────────────────────────────────────

/// One configured intervention.
///
/// The intervention applies from the start of `start_day` and is lifted at
/// the start of `end_day`, or of the following day when the two are equal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InterventionParam {
    pub kind:      InterventionKind,
    pub start_day: u32,
    pub end_day:   u32,
    #[serde(default)]
    pub params:    BTreeMap<String, f64>,
}

impl InterventionParam {
    /// An intervention using every parameter's default.
    pub fn new(kind: InterventionKind, start_day: u32, end_day: u32) -> Self {
        Self { kind, start_day, end_day, params: BTreeMap::new() }
    }

    /// Builder-style parameter override.
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.params.insert(name.to_owned(), value);
        self
    }

    /// The configured value of `name`, or its default.  Zero for names the
    /// kind does not know (rejected earlier by `validate`).
    pub fn get(&self, name: &str) -> f64 {
        self.params
            .get(name)
            .copied()
            .or_else(|| self.kind.default_param(name))
            .unwrap_or(0.0)
    }

    /// Window and parameter checks.  `index` is the position in the
    /// configured list, used only for error messages.
    pub fn validate(&self, index: usize) -> InterventionResult<()> {
        if self.start_day > self.end_day {
            return Err(InterventionError::InvalidWindow {
                index,
                kind:  self.kind,
                start: self.start_day,
                end:   self.end_day,
            });
        }
        let specs = self.kind.param_specs();
        for (name, &value) in &self.params {
            let Some(&(_, _, min, max)) = specs.iter().find(|s| s.0 == name) else {
                return Err(InterventionError::UnknownParameter {
                    index,
                    kind: self.kind,
                    name: name.clone(),
                });
            };
            // NaN fails both comparisons.
            if !(value >= min && value <= max) {
                return Err(InterventionError::InvalidParameter {
                    index,
                    kind: self.kind,
                    name: name.clone(),
                    value,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}
