//! The per-tick disease pass.
//!
//! # Step order
//!
//! ```text
//! step(now):
//!   1. snapshot every health state
//!   2. transmission: for each occupied room (building id, room order),
//!        each susceptible × each infectious co-occupant → one draw
//!   3. progression: for each individual (id order), one chain of draws
//!        against its snapshot state
//!   4. apply all changes; record each in the output reducer
//!   5. testing and tracing      (when TESTING is active)
//!   6. vaccination              (when VACCINATION is active)
//! ```
//!
//! Steps 2 and 3 read only the snapshot, so an individual exposed this tick
//! cannot progress further until the next one.
//!
//! Within a state the draws are ordered: worsening before mild recovery,
//! mortality before severe recovery.

use epi_agent::{Compliance, Individual, Population};
use epi_core::{AgentId, DAY_SECS, HealthState, SimRng, Timestamp, stream};
use epi_intervention::{ActivePolicies, TestingPolicy, TracingPolicy, VaccinationPolicy};
use epi_output::SimulationOutput;
use epi_spatial::Environment;

use crate::config::{DiseaseConfig, TickProbabilities, tick_probability};
use crate::contacts::ContactLog;
use crate::transmission::{RiskFactors, VaccineEffect, combined_transmission_probability};
use crate::{DiseaseError, DiseaseResult};

use HealthState::*;

/// What one [`Disease::step`] did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiseaseReport {
    pub exposures:   u32,
    /// All state changes, exposures included.
    pub transitions: u32,
    pub tests:       u32,
    pub positives:   u32,
    /// Contacts sent into isolation by tracing.
    pub traced:      u32,
    pub doses:       u32,
}

pub struct Disease {
    config:     DiseaseConfig,
    tick_days:  f64,
    probs:      TickProbabilities,
    seed:       u64,
    rng:        SimRng,
    contacts:   ContactLog,
    vaccine:    VaccineEffect,
    /// Fraction of a dose carried over to the next tick.
    dose_carry: f64,
    prune_day:  u32,
}

impl Disease {
    pub fn new(config: DiseaseConfig, tick_secs: u32, population: usize, seed: u64) -> DiseaseResult<Self> {
        config.validate()?;
        let tick_days = tick_secs as f64 / DAY_SECS as f64;
        Ok(Self {
            probs: config.tick_probabilities(tick_days),
            config,
            tick_days,
            seed,
            rng: SimRng::stream(seed, stream::DISEASE),
            contacts: ContactLog::new(population),
            vaccine: VaccineEffect::default(),
            dose_carry: 0.0,
            prune_day: 0,
        })
    }

    /// Re-seed and forget contacts, vaccine effect and dose carry.
    pub fn reset(&mut self) {
        self.rng = SimRng::stream(self.seed, stream::DISEASE);
        self.contacts.clear();
        self.vaccine = VaccineEffect::default();
        self.dose_carry = 0.0;
        self.prune_day = 0;
    }

    pub fn config(&self) -> &DiseaseConfig {
        &self.config
    }

    pub fn contacts(&self) -> &ContactLog {
        &self.contacts
    }

    /// Protection of vaccinated individuals, taken from the most recent
    /// active vaccination campaign.
    pub fn vaccine_effect(&self) -> VaccineEffect {
        self.vaccine
    }

    /// Make `count` distinct susceptible individuals infectious at `now`.
    ///
    /// The choice comes from its own stream, so seeding after a reset picks
    /// the same individuals.  Returns the chosen ids in ascending order.
    pub fn seed_infections(
        &mut self,
        count:      u32,
        now:        Timestamp,
        population: &mut Population,
        output:     &mut SimulationOutput,
    ) -> DiseaseResult<Vec<AgentId>> {
        let susceptible: Vec<AgentId> = population
            .individuals()
            .iter()
            .filter(|i| i.health == Susceptible)
            .map(|i| i.id)
            .collect();
        if count as usize > susceptible.len() {
            return Err(DiseaseError::TooManySeeds { requested: count, available: susceptible.len() });
        }
        let mut rng = SimRng::stream(self.seed, stream::SEEDING);
        let mut chosen = rng.sample(&susceptible, count as usize);
        chosen.sort_unstable();
        for &id in &chosen {
            set_state(population.get_mut(id), Infectious, now, output);
        }
        log::info!("seeded {count} infections");
        Ok(chosen)
    }

    /// One tick of transmission, progression, testing and vaccination; see
    /// the module docs.  Movement must already have been applied.
    pub fn step(
        &mut self,
        now:        Timestamp,
        policies:   &ActivePolicies,
        population: &mut Population,
        env:        &mut Environment,
        output:     &mut SimulationOutput,
    ) -> DiseaseReport {
        let mut report = DiseaseReport::default();
        if let Some(v) = policies.vaccination {
            self.vaccine = VaccineEffect {
                susceptibility_reduction: v.susceptibility_reduction,
                severity_reduction:       v.severity_reduction,
            };
        }
        self.maintain_contacts(now, policies.tracing);

        let states: Vec<HealthState> = population.individuals().iter().map(|i| i.health).collect();
        let mut changes: Vec<(AgentId, HealthState)> = Vec::new();
        self.transmit(now, policies, population, env, &states, &mut changes);
        report.exposures = changes.len() as u32;
        self.progress(population, &states, &mut changes);
        report.transitions = changes.len() as u32;

        for &(id, new) in &changes {
            let individual = population.get_mut(id);
            let old = set_state(individual, new, now, output);
            if old == SymptomaticSevere {
                individual.discharge(env);
            }
            if new == Deceased {
                individual.vacate(env);
                individual.isolating_until = None;
            }
        }

        if let Some(testing) = policies.testing {
            self.test(now, testing, policies.tracing, population, &mut report);
        }
        match policies.vaccination {
            Some(v) => self.vaccinate(now, v, population, output, &mut report),
            None => self.dose_carry = 0.0,
        }

        if report.transitions > 0 {
            log::debug!(
                "{now}: {} exposures, {} transitions, {} positives, {} doses",
                report.exposures,
                report.transitions,
                report.positives,
                report.doses,
            );
        }
        report
    }

    // ── Passes ────────────────────────────────────────────────────────────

    /// Once a day: drop contacts outside the tracing window, or all of them
    /// when tracing is not in force.
    fn maintain_contacts(&mut self, now: Timestamp, tracing: Option<TracingPolicy>) {
        if now.day() == self.prune_day {
            return;
        }
        self.prune_day = now.day();
        match tracing {
            Some(t) => self.contacts.prune(window_start(now, t.window_days)),
            None => self.contacts.clear(),
        }
    }

    fn transmit(
        &mut self,
        now:        Timestamp,
        policies:   &ActivePolicies,
        population: &Population,
        env:        &Environment,
        states:     &[HealthState],
        changes:    &mut Vec<(AgentId, HealthState)>,
    ) {
        let tracing = policies.tracing.is_some();
        let individuals = population.individuals();
        for building in env.buildings() {
            for (_, room) in building.occupied_rooms() {
                if tracing && room.len() > 1 {
                    self.contacts.record_room(room, now);
                }
                if !room.iter().any(|a| states[a.index()].is_infectious()) {
                    continue;
                }
                for &target in room {
                    if states[target.index()] != Susceptible {
                        continue;
                    }
                    for &source in room {
                        if !states[source.index()].is_infectious() {
                            continue;
                        }
                        let factors = RiskFactors::for_contact(
                            policies,
                            self.vaccine,
                            &individuals[source.index()],
                            &individuals[target.index()],
                        );
                        let p = combined_transmission_probability(self.probs.transmission, &factors);
                        if self.rng.gen_bool(p) {
                            log::trace!("{source} infected {target} in {}", building.id);
                            changes.push((target, Exposed));
                            break;
                        }
                    }
                }
            }
        }
    }

    fn progress(
        &mut self,
        population: &Population,
        states:     &[HealthState],
        changes:    &mut Vec<(AgentId, HealthState)>,
    ) {
        let p = self.probs;
        for individual in population.individuals() {
            let next = match states[individual.id.index()] {
                Exposed => self.rng.gen_bool(p.incubation).then_some(Infectious),
                Infectious => {
                    if self.rng.gen_bool(p.onset) {
                        if self.rng.gen_bool(self.config.asymptomatic_fraction) {
                            Some(Asymptomatic)
                        } else {
                            Some(SymptomaticMild)
                        }
                    } else {
                        None
                    }
                }
                Asymptomatic => self.rng.gen_bool(p.recovery_asymptomatic).then_some(Recovered),
                SymptomaticMild => {
                    let worsening = self.worsening_probability(individual);
                    if self.rng.gen_bool(worsening) {
                        Some(SymptomaticSevere)
                    } else if self.rng.gen_bool(p.recovery_mild) {
                        Some(Recovered)
                    } else {
                        None
                    }
                }
                SymptomaticSevere => {
                    if self.rng.gen_bool(p.mortality) {
                        Some(Deceased)
                    } else if self.rng.gen_bool(p.recovery_severe) {
                        Some(Recovered)
                    } else {
                        None
                    }
                }
                Susceptible | Recovered | Deceased => None,
            };
            if let Some(state) = next {
                changes.push((individual.id, state));
            }
        }
    }

    fn worsening_probability(&self, individual: &Individual) -> f64 {
        let reduction = if individual.doses > 0 { self.vaccine.severity_reduction } else { 0.0 };
        tick_probability(self.config.worsening_rate * (1.0 - reduction), self.tick_days)
    }

    fn test(
        &mut self,
        now:        Timestamp,
        testing:    TestingPolicy,
        tracing:    Option<TracingPolicy>,
        population: &mut Population,
        report:     &mut DiseaseReport,
    ) {
        let wait_secs = days_to_secs(testing.wait_days);
        let p_test = tick_probability(testing.test_rate, self.tick_days);
        let until = now.plus_secs(days_to_secs(testing.quarantine_days));

        let mut positives = Vec::new();
        for individual in population.individuals_mut() {
            if individual.tested || !individual.health.is_infectious() {
                continue;
            }
            let Some(since) = individual.infectious_since else {
                continue;
            };
            if now.since(since) < wait_secs || !self.rng.gen_bool(p_test) {
                continue;
            }
            individual.tested = true;
            report.tests += 1;
            if self.rng.gen_bool(testing.false_negative) {
                continue;
            }
            isolate(individual, until);
            positives.push(individual.id);
        }
        report.positives = positives.len() as u32;

        let Some(tracing) = tracing else {
            return;
        };
        let since = window_start(now, tracing.window_days);
        for &positive in &positives {
            for contact in self.contacts.contacts_since(positive, since) {
                let c = population.get_mut(contact);
                if c.health != Deceased && Compliance::complies(c.compliance.tracing, tracing.compliance) {
                    isolate(c, until);
                    report.traced += 1;
                }
            }
        }
        if !positives.is_empty() {
            log::debug!("{now}: {} positive tests, {} contacts traced", positives.len(), report.traced);
        }
    }

    fn vaccinate(
        &mut self,
        now:        Timestamp,
        policy:     VaccinationPolicy,
        population: &mut Population,
        output:     &mut SimulationOutput,
        report:     &mut DiseaseReport,
    ) {
        self.dose_carry += policy.doses_per_day * self.tick_days;
        let available = self.dose_carry.floor();
        self.dose_carry -= available;
        if available < 1.0 {
            return;
        }

        let day = now.day();
        let eligible: Vec<AgentId> = population
            .individuals()
            .iter()
            .filter(|i| {
                i.health == Susceptible
                    && i.doses < policy.max_doses
                    && i.last_dose_day.is_none_or(|d| day.saturating_sub(d) >= policy.interval_days)
                    && Compliance::complies(i.compliance.vaccination, policy.compliance)
            })
            .map(|i| i.id)
            .collect();
        for id in self.rng.sample(&eligible, available as usize) {
            let individual = population.get_mut(id);
            individual.doses += 1;
            individual.last_dose_day = Some(day);
            output.record_dose(individual.doses);
            report.doses += 1;
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Change one individual's health state and record it.  Returns the old
/// state.
fn set_state(
    individual: &mut Individual,
    new:        HealthState,
    now:        Timestamp,
    output:     &mut SimulationOutput,
) -> HealthState {
    let old = std::mem::replace(&mut individual.health, new);
    output.record_transition(old, new);
    match new {
        Infectious => {
            individual.infectious_since = Some(now);
            individual.tested = false;
        }
        Recovered | Deceased => individual.infectious_since = None,
        _ => {}
    }
    log::trace!("{}: {} → {}", individual.id, old.as_str(), new.as_str());
    old
}

fn isolate(individual: &mut Individual, until: Timestamp) {
    let until = individual.isolating_until.map_or(until, |u| u.max(until));
    individual.isolating_until = Some(until);
}

fn days_to_secs(days: f64) -> u64 {
    (days * DAY_SECS as f64).round() as u64
}

fn window_start(now: Timestamp, window_days: f64) -> Timestamp {
    Timestamp(now.0.saturating_sub(days_to_secs(window_days)))
}
