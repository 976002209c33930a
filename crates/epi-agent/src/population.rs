//! Population generation and the per-tick movement pass.
//!
//! # Generation
//!
//! Individuals are created in id order from the `POPULATION` stream:
//!
//! ```text
//! home      ← uniform residential building
//! role/age  ← draw against the cumulative fractions
//!               school   (5–17)   → school in the home component
//!               student  (18–24)  → university in the home component
//!               retired  (65–90)
//!               adult    (25–64)  → employed with `employment_rate`
//! amenities ← up to `amenities_per_individual`, same component
//! schedule  ← role template + per-individual jitter
//! ```
//!
//! Unemployed adults follow the `retired` template.  A role whose building
//! kind does not exist in the home component leaves the individual without a
//! workplace; its `WORK` slots are spent at home.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use epi_core::{AgentId, AgentRng, BuildingId, ComponentId, SimRng, stream};
use epi_schedule::{Role, ScheduleTemplates};
use epi_spatial::{BuildingCategory, Environment};

use crate::individual::{
    AgentSnapshot, Compliance, Individual, MovementConfig, MovementEvents, StepContext,
};
use crate::{AgentError, AgentResult};

// ── Config ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub size:                     u32,
    /// Probability an adult of working age has a workplace.
    pub employment_rate:          f64,
    /// Fraction of school-age individuals.
    pub student_fraction:         f64,
    /// Fraction of university students.
    pub university_fraction:      f64,
    pub retired_fraction:         f64,
    pub amenities_per_individual: u32,
    /// Maximum shift of an individual's schedule boundaries.
    pub schedule_jitter_secs:     u32,
    pub templates:                ScheduleTemplates,
    pub movement:                 MovementConfig,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size:                     1000,
            employment_rate:          0.8,
            student_fraction:         0.2,
            university_fraction:      0.08,
            retired_fraction:         0.17,
            amenities_per_individual: 3,
            schedule_jitter_secs:     1800,
            templates:                ScheduleTemplates::default(),
            movement:                 MovementConfig::default(),
        }
    }
}

impl PopulationConfig {
    pub fn validate(&self) -> AgentResult<()> {
        if self.size == 0 {
            return Err(AgentError::EmptyPopulation);
        }
        let probabilities = [
            ("employment_rate", self.employment_rate),
            ("student_fraction", self.student_fraction),
            ("university_fraction", self.university_fraction),
            ("retired_fraction", self.retired_fraction),
            ("movement.leisure_stay_prob", self.movement.leisure_stay_prob),
        ];
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(AgentError::InvalidConfig(format!("{name} = {p} is not in [0, 1]")));
            }
        }
        let fractions = self.student_fraction + self.university_fraction + self.retired_fraction;
        if fractions > 1.0 {
            return Err(AgentError::InvalidConfig(format!(
                "student, university and retired fractions sum to {fractions} > 1"
            )));
        }
        if !(self.movement.speed_m_per_s > 0.0 && self.movement.speed_m_per_s.is_finite()) {
            return Err(AgentError::InvalidConfig(format!(
                "movement.speed_m_per_s = {} must be positive",
                self.movement.speed_m_per_s
            )));
        }
        Ok(())
    }
}

// ── Catchments ────────────────────────────────────────────────────────────────

/// Buildings an individual living in one component can be assigned.
#[derive(Default)]
struct Catchment {
    schools:      Vec<BuildingId>,
    universities: Vec<BuildingId>,
    workplaces:   Vec<BuildingId>,
    amenities:    Vec<BuildingId>,
}

fn catchments(env: &Environment) -> BTreeMap<ComponentId, Catchment> {
    let mut map: BTreeMap<ComponentId, Catchment> = BTreeMap::new();
    for b in env.buildings() {
        let c = map.entry(env.component_of(b.id)).or_default();
        match b.category {
            BuildingCategory::School     => c.schools.push(b.id),
            BuildingCategory::University => c.universities.push(b.id),
            cat if cat.is_workplace()    => c.workplaces.push(b.id),
            cat if cat.is_amenity()      => c.amenities.push(b.id),
            _ => {}
        }
    }
    map
}

// ── Population ────────────────────────────────────────────────────────────────

/// The individuals of a run and their per-agent movement RNGs.
pub struct Population {
    individuals: Vec<Individual>,
    rngs:        Vec<AgentRng>,
    seed:        u64,
    movement:    MovementConfig,
}

impl Population {
    /// Generate `config.size` individuals and place everyone at home.
    ///
    /// # Errors
    ///
    /// [`AgentError::EmptyPopulation`] / [`AgentError::InvalidConfig`] for a
    /// bad config, [`AgentError::NoResidentialBuildings`] when nobody can be
    /// housed.  `env` is not touched on error.
    pub fn generate(env: &mut Environment, config: &PopulationConfig, seed: u64) -> AgentResult<Self> {
        config.validate()?;
        let homes = env.buildings_of(BuildingCategory::Residential).to_vec();
        if homes.is_empty() {
            return Err(AgentError::NoResidentialBuildings);
        }

        let catchments = catchments(env);
        let empty = Catchment::default();
        let mut rng = SimRng::stream(seed, stream::POPULATION);
        let jitter_seed = SimRng::stream_seed(seed, stream::POPULATION);

        let school_cut = config.student_fraction;
        let university_cut = school_cut + config.university_fraction;
        let retired_cut = university_cut + config.retired_fraction;

        let mut individuals = Vec::with_capacity(config.size as usize);
        for i in 0..config.size {
            let id = AgentId(i);
            let home = *rng.choose(&homes).ok_or(AgentError::NoResidentialBuildings)?;
            let catchment = catchments.get(&env.component_of(home)).unwrap_or(&empty);

            let r = rng.unit();
            let (role, age, work) = if r < school_cut {
                (Role::Student, rng.gen_range(5..=17u8), rng.choose(&catchment.schools).copied())
            } else if r < university_cut {
                (Role::Student, rng.gen_range(18..=24u8), rng.choose(&catchment.universities).copied())
            } else if r < retired_cut {
                (Role::Retired, rng.gen_range(65..=90u8), None)
            } else {
                let age = rng.gen_range(25..=64u8);
                let work = if rng.gen_bool(config.employment_rate) {
                    rng.choose(&catchment.workplaces).copied()
                } else {
                    None
                };
                match work {
                    Some(w) => (Role::Worker, age, Some(w)),
                    None => (Role::Retired, age, None),
                }
            };
            let essential = work
                .is_some_and(|w| env.building(w).category == BuildingCategory::EssentialWorkplace);

            let wanted = (config.amenities_per_individual as usize).min(catchment.amenities.len());
            let mut amenities = rng.sample(&catchment.amenities, wanted);
            amenities.sort_unstable();

            let compliance = Compliance::draw(&mut rng);
            let mut jitter_rng = AgentRng::new(jitter_seed, id);
            let schedule = config
                .templates
                .instantiate(role, config.schedule_jitter_secs, &mut jitter_rng);

            individuals.push(Individual::new(
                id, age, role, home, work, essential, amenities, schedule, compliance,
            ));
        }

        let mut population = Self {
            individuals,
            rngs: Vec::new(),
            seed,
            movement: config.movement.clone(),
        };
        population.reset(env);

        let workers = population.individuals.iter().filter(|i| i.work.is_some()).count();
        log::info!(
            "population generated: {} individuals, {} with a workplace or school",
            population.len(),
            workers,
        );
        Ok(population)
    }

    /// Re-seed every movement RNG, return everyone to the initial state and
    /// place them at home.
    ///
    /// Expects `env` to have been reset first (rooms empty).
    pub fn reset(&mut self, env: &mut Environment) {
        let movement_seed = SimRng::stream_seed(self.seed, stream::MOVEMENT);
        self.rngs = self
            .individuals
            .iter()
            .map(|i| AgentRng::new(movement_seed, i.id))
            .collect();
        for (individual, rng) in self.individuals.iter_mut().zip(&mut self.rngs) {
            individual.reset();
            individual.place_at_home(env, rng);
        }
    }

    /// Decide and move every individual for one tick, in id order.
    pub fn step(&mut self, env: &mut Environment, ctx: &StepContext<'_>) -> MovementEvents {
        let mut events = MovementEvents::default();
        for (individual, rng) in self.individuals.iter_mut().zip(&mut self.rngs) {
            individual.step(env, ctx, &self.movement, rng, &mut events);
        }
        if !events.refusals.is_empty() {
            log::debug!("{} hospital admissions refused", events.refusals.len());
        }
        events
    }

    // ── Access ────────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    #[inline]
    pub fn get(&self, id: AgentId) -> &Individual {
        &self.individuals[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: AgentId) -> &mut Individual {
        &mut self.individuals[id.index()]
    }

    /// Checked lookup for ids coming from outside the engine.
    pub fn try_get(&self, id: AgentId) -> AgentResult<&Individual> {
        self.individuals.get(id.index()).ok_or(AgentError::UnknownAgent(id))
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn individuals_mut(&mut self) -> &mut [Individual] {
        &mut self.individuals
    }

    pub fn movement(&self) -> &MovementConfig {
        &self.movement
    }

    /// Immutable copy of every individual's position, health and activity.
    pub fn snapshot(&self) -> Vec<AgentSnapshot> {
        self.individuals.iter().map(AgentSnapshot::from).collect()
    }
}
