//! Disease rates and their per-tick probabilities.
//!
//! Every rate is per simulated day.  A transition with rate `r` fires in one
//! tick of `Δ` days with probability
//!
//! ```text
//! p = 1 − exp(−r · Δ)
//! ```
//!
//! which makes the outcome independent of the tick length to first order.

use serde::{Deserialize, Serialize};

use crate::{DiseaseError, DiseaseResult};

/// Probability that an event with rate `rate_per_day` fires within one tick.
#[inline]
pub fn tick_probability(rate_per_day: f64, tick_days: f64) -> f64 {
    1.0 - (-rate_per_day * tick_days).exp()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiseaseConfig {
    /// Infection rate of one infectious co-occupant, per susceptible.
    pub transmission_rate:        f64,
    /// `EXPOSED → INFECTIOUS`.
    pub incubation_rate:          f64,
    /// `INFECTIOUS → ASYMPTOMATIC | SYMPTOMATIC_MILD`.
    pub onset_rate:               f64,
    /// Share of onsets that are asymptomatic.
    pub asymptomatic_fraction:    f64,
    /// `SYMPTOMATIC_MILD → SYMPTOMATIC_SEVERE`.
    pub worsening_rate:           f64,
    /// `SYMPTOMATIC_SEVERE → DECEASED`.
    pub mortality_rate:           f64,
    pub recovery_rate_asymptomatic: f64,
    pub recovery_rate_mild:       f64,
    pub recovery_rate_severe:     f64,
}

impl Default for DiseaseConfig {
    fn default() -> Self {
        Self {
            transmission_rate:          1.0,
            incubation_rate:            1.0 / 5.0,
            onset_rate:                 1.0 / 2.0,
            asymptomatic_fraction:      0.4,
            worsening_rate:             0.05,
            mortality_rate:             0.02,
            recovery_rate_asymptomatic: 1.0 / 7.0,
            recovery_rate_mild:         1.0 / 10.0,
            recovery_rate_severe:       1.0 / 14.0,
        }
    }
}

impl DiseaseConfig {
    pub fn validate(&self) -> DiseaseResult<()> {
        let rates = [
            ("transmission_rate", self.transmission_rate),
            ("incubation_rate", self.incubation_rate),
            ("onset_rate", self.onset_rate),
            ("worsening_rate", self.worsening_rate),
            ("mortality_rate", self.mortality_rate),
            ("recovery_rate_asymptomatic", self.recovery_rate_asymptomatic),
            ("recovery_rate_mild", self.recovery_rate_mild),
            ("recovery_rate_severe", self.recovery_rate_severe),
        ];
        for (name, value) in rates {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(DiseaseError::InvalidParameter {
                    name,
                    value,
                    reason: "rates must be finite and non-negative",
                });
            }
        }
        if !(0.0..=1.0).contains(&self.asymptomatic_fraction) {
            return Err(DiseaseError::InvalidParameter {
                name:   "asymptomatic_fraction",
                value:  self.asymptomatic_fraction,
                reason: "must be a probability",
            });
        }
        Ok(())
    }

    pub(crate) fn tick_probabilities(&self, tick_days: f64) -> TickProbabilities {
        let p = |rate| tick_probability(rate, tick_days);
        TickProbabilities {
            transmission:          p(self.transmission_rate),
            incubation:            p(self.incubation_rate),
            onset:                 p(self.onset_rate),
            mortality:             p(self.mortality_rate),
            recovery_asymptomatic: p(self.recovery_rate_asymptomatic),
            recovery_mild:         p(self.recovery_rate_mild),
            recovery_severe:       p(self.recovery_rate_severe),
        }
    }
}

/// The rates that do not depend on the individual, converted once per run.
/// Worsening is converted per individual because vaccination scales it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct TickProbabilities {
    pub transmission:          f64,
    pub incubation:            f64,
    pub onset:                 f64,
    pub mortality:             f64,
    pub recovery_asymptomatic: f64,
    pub recovery_mild:         f64,
    pub recovery_severe:       f64,
}
