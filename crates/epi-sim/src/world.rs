//! The simulated world: every component, built together and ticked
//! together.

use epi_agent::{Population, StepContext};
use epi_core::{AgentId, SimClock, Timestamp};
use epi_disease::{Disease, DiseaseReport};
use epi_intervention::{InterventionChanges, Interventions};
use epi_output::SimulationOutput;
use epi_spatial::{Environment, Geometry};

use crate::{SimResult, SimulationConfig};

/// What one [`World::tick`] did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Simulated time at the start of the tick.
    pub now:        Timestamp,
    pub admissions: u32,
    /// Severe individuals turned away by a full hospital.
    pub refusals:   u32,
    pub disease:    DiseaseReport,
    /// Interventions applied at the day rollover, if the tick crossed one.
    pub day_changes: Option<InterventionChanges>,
    /// The duration was reached at the end of this tick.
    pub finished:   bool,
}

pub struct World {
    env:              Environment,
    interventions:    Interventions,
    output:           SimulationOutput,
    population:       Population,
    disease:          Disease,
    clock:            SimClock,
    duration_days:    u32,
    initial_infected: u32,
    seeded:           Vec<AgentId>,
}

impl World {
    /// Build every component in dependency order, then bring the world to
    /// day 0 exactly as [`reset`](Self::reset) does.
    ///
    /// `config` must already be validated.
    pub fn build(config: &SimulationConfig, geometry: &Geometry) -> SimResult<Self> {
        let mut env = Environment::build(geometry, &config.environment)?;
        let interventions = Interventions::new(config.interventions.clone())?;
        let output = SimulationOutput::new(config.population.size, config.output.clone());
        let population = Population::generate(&mut env, &config.population, config.seed)?;
        let disease = Disease::new(config.disease.clone(), config.tick_secs, population.len(), config.seed)?;

        let mut world = Self {
            env,
            interventions,
            output,
            population,
            disease,
            clock: SimClock::new(config.tick_secs)?,
            duration_days: config.duration_days,
            initial_infected: config.initial_infected,
            seeded: Vec::new(),
        };
        world.reset()?;
        log::info!(
            "world built: {} buildings, {} individuals, {} interventions",
            world.env.building_count(),
            world.population.len(),
            world.interventions.params().len(),
        );
        Ok(world)
    }

    /// Back to day 0 without rebuilding the graph: occupancy and closures
    /// cleared, everyone home and susceptible, interventions replayed for
    /// day 0, counts cleared, RNG streams re-seeded, initial infections
    /// seeded again.
    pub fn reset(&mut self) -> SimResult<()> {
        self.clock.reset();
        self.env.reset();
        self.interventions.reset(&mut self.env);
        self.population.reset(&mut self.env);
        self.output.reset(self.population.len() as u32);
        self.disease.reset();
        self.seeded = self.disease.seed_infections(
            self.initial_infected,
            self.clock.now(),
            &mut self.population,
            &mut self.output,
        )?;
        Ok(())
    }

    /// One tick: movement, disease, output, clock; interventions on a day
    /// rollover; the final output sample when the duration is reached.
    pub fn tick(&mut self) -> TickReport {
        let now = self.clock.now();
        let policies = self.interventions.policies();

        let ctx = StepContext { now, tick_secs: self.clock.tick_secs, policies };
        let events = self.population.step(&mut self.env, &ctx);
        self.output.record_admissions(events.admissions.len() as u32);
        if !events.refusals.is_empty() {
            log::debug!("{now}: {} individuals refused a hospital bed", events.refusals.len());
        }

        let disease = self.disease.step(now, policies, &mut self.population, &mut self.env, &mut self.output);
        self.output.step(now, self.env.occupied_beds());

        let day_changes = if self.clock.advance() {
            let day = self.clock.day;
            log::debug!("day {day} begins: {} active cases", self.output.counts().active_cases());
            Some(self.interventions.step(day, &mut self.env))
        } else {
            None
        };

        let finished = self.is_finished();
        if finished {
            self.output.finish(self.clock.now(), self.env.occupied_beds());
        }

        TickReport {
            now,
            admissions: events.admissions.len() as u32,
            refusals: events.refusals.len() as u32,
            disease,
            day_changes,
            finished,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.clock.day >= self.duration_days
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn interventions(&self) -> &Interventions {
        &self.interventions
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn disease(&self) -> &Disease {
        &self.disease
    }

    pub fn output(&self) -> &SimulationOutput {
        &self.output
    }

    /// Individuals seeded as infectious at day 0, ascending.
    pub fn seeded(&self) -> &[AgentId] {
        &self.seeded
    }

    pub fn duration_days(&self) -> u32 {
        self.duration_days
    }
}
