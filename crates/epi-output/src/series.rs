//! Epidemic time series.
//!
//! # Recording
//!
//! Disease code reports every health-state change through
//! [`SimulationOutput::record_transition`] in the same step it applies it,
//! plus hospital admissions and vaccine doses.  Once per tick the coordinator
//! calls [`SimulationOutput::step`]:
//!
//! ```text
//! step(now, hospitalised):
//!   close every incidence bucket that ended at or before `now`
//!   add this tick's new cases to the open bucket
//!   if now ≥ next sample time: append an OutputSample
//! ```
//!
//! A *case* is any departure from `SUSCEPTIBLE` (exposure, or direct seeding
//! as infectious).  Cumulative counters only ever grow.

use serde::{Deserialize, Serialize};

use epi_core::{DAY_SECS, HealthState, Timestamp};

use crate::compartment::CompartmentTable;

// ── Config ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Width of one incidence bucket.
    pub incidence_period_secs: u32,
    /// Interval between two recorded samples.
    pub sample_interval_secs:  u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { incidence_period_secs: DAY_SECS, sample_interval_secs: 3600 }
    }
}

// ── Sample ────────────────────────────────────────────────────────────────────

/// Every series value at one timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputSample {
    pub timestamp:             Timestamp,
    /// Counts in [`HealthState::ALL`] order.
    pub states:                [u32; HealthState::COUNT],
    pub prevalent:             u32,
    pub cumulative_cases:      u32,
    /// Beds currently occupied.
    pub hospitalised:          u32,
    pub cumulative_admissions: u32,
    pub cumulative_deaths:     u32,
    /// `doses[k]` = individuals who have received dose `k + 1`.
    pub doses:                 Vec<u32>,
}

/// A scalar series that can be extracted from the samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    State(HealthState),
    Prevalent,
    CumulativeCases,
    Hospitalised,
    CumulativeAdmissions,
    CumulativeDeaths,
    /// Individuals who have received dose `n` (1-based).
    Dose(u32),
}

impl OutputSample {
    pub fn value(&self, metric: Metric) -> u32 {
        match metric {
            Metric::State(s)             => self.states[s.index()],
            Metric::Prevalent            => self.prevalent,
            Metric::CumulativeCases      => self.cumulative_cases,
            Metric::Hospitalised         => self.hospitalised,
            Metric::CumulativeAdmissions => self.cumulative_admissions,
            Metric::CumulativeDeaths     => self.cumulative_deaths,
            Metric::Dose(n) => n
                .checked_sub(1)
                .and_then(|k| self.doses.get(k as usize))
                .copied()
                .unwrap_or(0),
        }
    }
}

// ── SimulationOutput ──────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct SimulationOutput {
    config:      OutputConfig,
    table:       CompartmentTable,

    cumulative_cases:      u32,
    cumulative_admissions: u32,
    cumulative_deaths:     u32,
    doses:                 Vec<u32>,

    /// Cases recorded since the last `step`.
    tick_cases:   u32,
    bucket_start: Timestamp,
    bucket_cases: u32,
    incidence:    Vec<(Timestamp, u32)>,

    next_sample:  Timestamp,
    samples:      Vec<OutputSample>,
}

impl SimulationOutput {
    pub fn new(population: u32, config: OutputConfig) -> Self {
        Self {
            config,
            table:                 CompartmentTable::new(population),
            cumulative_cases:      0,
            cumulative_admissions: 0,
            cumulative_deaths:     0,
            doses:                 Vec::new(),
            tick_cases:            0,
            bucket_start:          Timestamp::ZERO,
            bucket_cases:          0,
            incidence:             Vec::new(),
            next_sample:           Timestamp::ZERO,
            samples:               Vec::new(),
        }
    }

    /// Clear every series and counter; `population` individuals, all
    /// susceptible.
    pub fn reset(&mut self, population: u32) {
        *self = Self::new(population, self.config.clone());
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    // ── Recording ─────────────────────────────────────────────────────────

    /// One individual changed state.  Must be called exactly once per
    /// change.
    pub fn record_transition(&mut self, old: HealthState, new: HealthState) {
        if old == new {
            return;
        }
        self.table.apply(old, new);
        if old == HealthState::Susceptible {
            self.tick_cases += 1;
            self.cumulative_cases += 1;
        }
        if new == HealthState::Deceased {
            self.cumulative_deaths += 1;
        }
    }

    pub fn record_admissions(&mut self, count: u32) {
        self.cumulative_admissions += count;
    }

    /// An individual received dose number `dose` (1-based).
    pub fn record_dose(&mut self, dose: u32) {
        let Some(k) = dose.checked_sub(1) else {
            return;
        };
        let k = k as usize;
        if self.doses.len() <= k {
            self.doses.resize(k + 1, 0);
        }
        self.doses[k] += 1;
    }

    /// Close finished incidence buckets and sample if due.
    pub fn step(&mut self, now: Timestamp, hospitalised: u32) {
        let period = self.config.incidence_period_secs.max(1) as u64;
        while now >= self.bucket_start.plus_secs(period) {
            self.incidence.push((self.bucket_start, self.bucket_cases));
            self.bucket_cases = 0;
            self.bucket_start = self.bucket_start.plus_secs(period);
        }
        self.bucket_cases += std::mem::take(&mut self.tick_cases);

        if now >= self.next_sample {
            self.push_sample(now, hospitalised);
            let interval = self.config.sample_interval_secs.max(1) as u64;
            while self.next_sample <= now {
                self.next_sample = self.next_sample.plus_secs(interval);
            }
        }
    }

    /// Record the final state: the open incidence bucket and a last sample
    /// at `now` (unless one was just taken).
    pub fn finish(&mut self, now: Timestamp, hospitalised: u32) {
        self.bucket_cases += std::mem::take(&mut self.tick_cases);
        if self.bucket_start < now || self.bucket_cases > 0 {
            self.incidence.push((self.bucket_start, self.bucket_cases));
            self.bucket_cases = 0;
            self.bucket_start = now;
        }
        if self.samples.last().is_none_or(|s| s.timestamp < now) {
            self.push_sample(now, hospitalised);
        }
    }

    fn push_sample(&mut self, now: Timestamp, hospitalised: u32) {
        self.samples.push(OutputSample {
            timestamp:             now,
            states:                self.table.as_array(),
            prevalent:             self.table.active_cases(),
            cumulative_cases:      self.cumulative_cases,
            hospitalised,
            cumulative_admissions: self.cumulative_admissions,
            cumulative_deaths:     self.cumulative_deaths,
            doses:                 self.doses.clone(),
        });
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Live compartment counts.
    pub fn counts(&self) -> &CompartmentTable {
        &self.table
    }

    pub fn cumulative_cases(&self) -> u32 {
        self.cumulative_cases
    }

    pub fn cumulative_admissions(&self) -> u32 {
        self.cumulative_admissions
    }

    pub fn cumulative_deaths(&self) -> u32 {
        self.cumulative_deaths
    }

    /// Individuals who have received dose `n` (1-based).
    pub fn doses_given(&self, n: u32) -> u32 {
        n.checked_sub(1)
            .and_then(|k| self.doses.get(k as usize))
            .copied()
            .unwrap_or(0)
    }

    /// Highest dose number given so far.
    pub fn max_dose(&self) -> u32 {
        self.doses.len() as u32
    }

    pub fn samples(&self) -> &[OutputSample] {
        &self.samples
    }

    /// `(bucket start, new cases)` for every closed bucket.
    pub fn incidence(&self) -> &[(Timestamp, u32)] {
        &self.incidence
    }

    /// One scalar series over all samples.
    pub fn series(&self, metric: Metric) -> Vec<(Timestamp, u32)> {
        self.samples.iter().map(|s| (s.timestamp, s.value(metric))).collect()
    }
}
