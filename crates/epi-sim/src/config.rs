//! Top-level simulation configuration.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use epi_agent::PopulationConfig;
use epi_core::SimClock;
use epi_disease::DiseaseConfig;
use epi_intervention::InterventionParam;
use epi_output::OutputConfig;
use epi_spatial::EnvironmentConfig;

use crate::{SimError, SimResult};

/// Everything needed to build and run one simulation, apart from the
/// geometry.
///
/// Typically loaded from JSON; every field has a default so a file only
/// lists what it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Simulated seconds per tick.  Must divide a day.  Default: 60.
    pub tick_secs: u32,

    /// The run finishes when the day counter reaches this value.
    pub duration_days: u32,

    /// Individuals made infectious at day 0.
    pub initial_infected: u32,

    /// Wall-clock period between two ticks at speed 1.
    pub base_interval_ms: u64,

    pub environment:   EnvironmentConfig,
    pub population:    PopulationConfig,
    pub disease:       DiseaseConfig,
    pub output:        OutputConfig,
    pub interventions: Vec<InterventionParam>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed:             42,
            tick_secs:        60,
            duration_days:    60,
            initial_infected: 10,
            base_interval_ms: 50,
            environment:      EnvironmentConfig::default(),
            population:       PopulationConfig::default(),
            disease:          DiseaseConfig::default(),
            output:           OutputConfig::default(),
            interventions:    Vec::new(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json_reader<R: Read>(reader: R) -> SimResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json_path(path: &Path) -> SimResult<Self> {
        Self::from_json_reader(BufReader::new(File::open(path)?))
    }

    /// Range checks on every section, run before any state is built.
    pub fn validate(&self) -> SimResult<()> {
        SimClock::new(self.tick_secs)?;
        if self.duration_days == 0 {
            return Err(SimError::Config("duration_days must be at least 1".into()));
        }
        if self.base_interval_ms == 0 {
            return Err(SimError::Config("base_interval_ms must be positive".into()));
        }
        if self.output.incidence_period_secs == 0 || self.output.sample_interval_secs == 0 {
            return Err(SimError::Config("output periods must be positive".into()));
        }
        self.population.validate()?;
        if self.initial_infected > self.population.size {
            return Err(SimError::Config(format!(
                "initial_infected = {} exceeds population size {}",
                self.initial_infected, self.population.size
            )));
        }
        self.disease.validate()?;
        for (i, p) in self.interventions.iter().enumerate() {
            p.validate(i)?;
        }
        Ok(())
    }

    pub fn base_interval(&self) -> Duration {
        Duration::from_millis(self.base_interval_ms)
    }
}
