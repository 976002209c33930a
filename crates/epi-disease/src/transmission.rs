//! The transmission combination rule.
//!
//! Each modifier is an independent multiplicative risk reduction:
//!
//! ```text
//! p = base · (1 − outgoing·[source masked])
//!          · (1 − incoming·[target masked])
//!          · (1 − distancing·[target distancing])
//!          · (1 − susceptibility reduction·[target vaccinated])
//! ```
//!
//! clamped to `[0, 1]`.

use epi_agent::{Compliance, Individual};
use epi_intervention::ActivePolicies;

/// The reductions that apply to one `(source, target)` contact, each already
/// zero when the corresponding condition does not hold.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RiskFactors {
    /// Outgoing mask protection of the source.
    pub source_mask: f64,
    /// Incoming mask protection of the target.
    pub target_mask: f64,
    pub distancing:  f64,
    /// Vaccine susceptibility reduction of the target.
    pub vaccine:     f64,
}

/// Protection a vaccinated individual keeps after the campaign ends.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VaccineEffect {
    pub susceptibility_reduction: f64,
    pub severity_reduction:       f64,
}

impl RiskFactors {
    pub fn for_contact(
        policies: &ActivePolicies,
        vaccine:  VaccineEffect,
        source:   &Individual,
        target:   &Individual,
    ) -> Self {
        let mut f = RiskFactors::default();
        if let Some(m) = policies.masks {
            if Compliance::complies(source.compliance.masks, m.compliance) {
                f.source_mask = m.outgoing;
            }
            if Compliance::complies(target.compliance.masks, m.compliance) {
                f.target_mask = m.incoming;
            }
        }
        if let Some(d) = policies.distancing {
            if Compliance::complies(target.compliance.distancing, d.compliance) {
                f.distancing = d.reduction;
            }
        }
        if target.doses > 0 {
            f.vaccine = vaccine.susceptibility_reduction;
        }
        f
    }
}

pub fn combined_transmission_probability(base: f64, factors: &RiskFactors) -> f64 {
    let p = base
        * (1.0 - factors.source_mask)
        * (1.0 - factors.target_mask)
        * (1.0 - factors.distancing)
        * (1.0 - factors.vaccine);
    p.clamp(0.0, 1.0)
}
