//! Typed view of the currently active interventions.
//!
//! Movement and disease code never look at raw parameter maps; they read an
//! [`ActivePolicies`] value that the scheduler recomputes whenever the active
//! set changes.  `None` means the intervention is not in force.

use crate::param::{InterventionKind, InterventionParam};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaskPolicy {
    /// Protection of a masked susceptible individual.
    pub incoming:   f64,
    /// Protection provided by a masked infectious individual.
    pub outgoing:   f64,
    pub compliance: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistancingPolicy {
    pub reduction:  f64,
    pub compliance: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TestingPolicy {
    /// Days an individual must have been infectious before it can be tested.
    pub wait_days:       f64,
    /// Tests per eligible individual per day.
    pub test_rate:       f64,
    pub false_negative:  f64,
    pub quarantine_days: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TracingPolicy {
    pub window_days: f64,
    pub compliance:  f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LockdownPolicy {
    pub compliance:     f64,
    /// Probability a complying individual still travels for leisure.
    pub leisure_travel: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VaccinationPolicy {
    pub doses_per_day:            f64,
    pub compliance:               f64,
    pub max_doses:                u32,
    pub interval_days:            u32,
    pub susceptibility_reduction: f64,
    pub severity_reduction:       f64,
}

/// Everything disease and movement code needs to know about the active
/// interventions.  Closures are not listed here; they are visible directly
/// on the buildings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActivePolicies {
    pub masks:       Option<MaskPolicy>,
    pub distancing:  Option<DistancingPolicy>,
    pub testing:     Option<TestingPolicy>,
    pub tracing:     Option<TracingPolicy>,
    pub lockdown:    Option<LockdownPolicy>,
    pub vaccination: Option<VaccinationPolicy>,
}

impl ActivePolicies {
    /// Fold one active intervention into the view.  Applying a later
    /// intervention of the same kind replaces the earlier one.
    pub fn apply(&mut self, p: &InterventionParam) {
        match p.kind {
            InterventionKind::Masks => {
                self.masks = Some(MaskPolicy {
                    incoming:   p.get("incoming"),
                    outgoing:   p.get("outgoing"),
                    compliance: p.get("compliance"),
                });
            }
            InterventionKind::SocialDistancing => {
                self.distancing = Some(DistancingPolicy {
                    reduction:  p.get("reduction"),
                    compliance: p.get("compliance"),
                });
            }
            InterventionKind::Testing => {
                self.testing = Some(TestingPolicy {
                    wait_days:       p.get("wait_days"),
                    test_rate:       p.get("test_rate"),
                    false_negative:  p.get("false_negative"),
                    quarantine_days: p.get("quarantine_days"),
                });
            }
            InterventionKind::ContactTracing => {
                self.tracing = Some(TracingPolicy {
                    window_days: p.get("window_days"),
                    compliance:  p.get("compliance"),
                });
            }
            InterventionKind::Lockdown => {
                self.lockdown = Some(LockdownPolicy {
                    compliance:     p.get("compliance"),
                    leisure_travel: p.get("leisure_travel"),
                });
            }
            InterventionKind::Vaccination => {
                self.vaccination = Some(VaccinationPolicy {
                    doses_per_day:            p.get("doses_per_day"),
                    compliance:               p.get("compliance"),
                    max_doses:                p.get("max_doses").round() as u32,
                    interval_days:            p.get("interval_days").round() as u32,
                    susceptibility_reduction: p.get("susceptibility_reduction"),
                    severity_reduction:       p.get("severity_reduction"),
                });
            }
            InterventionKind::SchoolClosure
            | InterventionKind::UniversityClosure
            | InterventionKind::WorkplaceClosure => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == ActivePolicies::default()
    }
}
