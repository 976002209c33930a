//! One individual: assignments, activity state machine, and movement.
//!
//! # Decision tree (once per tick, only when not mid-route)
//!
//! ```text
//! DECEASED                        → frozen
//! SEVERE and not hospitalised     → admission: HOSPITALISATION + route to bed
//!                                   refused:   ISOLATION + route home
//! hospitalised                    → stay in the hospital
//! isolating (deadline in future)  → ISOLATION + route home
//! otherwise, by schedule:
//!   SLEEP   → home
//!   WORK    → workplace; home if none, closed, or locked down
//!   LEISURE → stay at the current amenity with `leisure_stay_prob`,
//!             else a uniform amenity; home if closed or locked down
//! ```
//!
//! # Movement
//!
//! A trip walks the nodes of a cached [`RoutePath`].  Each tick the
//! individual has a budget of `speed × tick` metres.  Whole hops consume
//! exactly their length and the remainder carries over to the next hop, so
//! several nodes can be passed in one tick; a hop the budget cannot finish is
//! interpolated linearly.  Reaching the last node ends the trip, places the
//! individual in a room of the destination, and drops any leftover budget.

use serde::{Deserialize, Serialize};

use epi_core::{AgentId, AgentRng, BuildingId, HealthState, NodeId, Point, SimRng, Timestamp};
use epi_intervention::ActivePolicies;
use epi_schedule::{Activity, Role, Schedule};
use epi_spatial::{Environment, RoutePath};

// ── Config ────────────────────────────────────────────────────────────────────

/// Movement parameters shared by the whole population.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Walking speed in metres per second.
    pub speed_m_per_s:     f64,
    /// Per-tick probability of staying at the current amenity during
    /// leisure time.
    pub leisure_stay_prob: f64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self { speed_m_per_s: 1.4, leisure_stay_prob: 0.95 }
    }
}

// ── Compliance ────────────────────────────────────────────────────────────────

/// Stable per-individual draws in `[0, 1)`.  An individual complies with a
/// policy of compliance `c` iff its draw is below `c`, so the same people
/// comply every tick and raising `c` only adds compliers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Compliance {
    pub masks:       f64,
    pub distancing:  f64,
    pub lockdown:    f64,
    pub tracing:     f64,
    pub vaccination: f64,
}

impl Compliance {
    pub fn draw(rng: &mut SimRng) -> Self {
        Self {
            masks:       rng.unit(),
            distancing:  rng.unit(),
            lockdown:    rng.unit(),
            tracing:     rng.unit(),
            vaccination: rng.unit(),
        }
    }

    /// Everybody complies with everything.
    pub const ALWAYS: Compliance = Compliance {
        masks:       0.0,
        distancing:  0.0,
        lockdown:    0.0,
        tracing:     0.0,
        vaccination: 0.0,
    };

    #[inline]
    pub fn complies(draw: f64, rate: f64) -> bool {
        draw < rate
    }
}

// ── Trip ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct Trip {
    path:        RoutePath,
    /// Index of the next route node to reach.
    next:        usize,
    destination: BuildingId,
}

// ── Per-tick context ──────────────────────────────────────────────────────────

/// Read-only inputs to one population step.
#[derive(Clone, Copy)]
pub struct StepContext<'a> {
    pub now:       Timestamp,
    pub tick_secs: u32,
    pub policies:  &'a ActivePolicies,
}

/// Hospital outcomes of one population step, in individual order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MovementEvents {
    pub admissions: Vec<(AgentId, BuildingId)>,
    pub refusals:   Vec<AgentId>,
}

// ── Individual ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Individual {
    pub id:        AgentId,
    pub age:       u8,
    pub role:      Role,
    pub home:      BuildingId,
    /// Workplace, school or university.
    pub work:      Option<BuildingId>,
    /// Works at an essential workplace (exempt from lockdown).
    pub essential: bool,
    pub amenities: Vec<BuildingId>,
    pub schedule:  Schedule,
    pub compliance: Compliance,

    pub activity:  Activity,
    pub position:  Point,
    /// Last graph node reached.
    pub location:  NodeId,
    /// Current building, or the building the current trip started from.
    pub building:  BuildingId,
    /// Room in `building`; meaningful only when not travelling.
    pub room:      u16,
    work_room:     Option<u16>,
    trip:          Option<Trip>,

    pub health:    HealthState,
    pub hospital:  Option<BuildingId>,
    pub isolating_until: Option<Timestamp>,
    /// When the individual last became infectious.
    pub infectious_since: Option<Timestamp>,
    /// Tested during the current infection.
    pub tested:    bool,
    pub doses:     u32,
    pub last_dose_day: Option<u32>,
}

impl Individual {
    /// A fresh individual at home.  Call [`place_at_home`](Self::place_at_home)
    /// before the first step.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id:         AgentId,
        age:        u8,
        role:       Role,
        home:       BuildingId,
        work:       Option<BuildingId>,
        essential:  bool,
        amenities:  Vec<BuildingId>,
        schedule:   Schedule,
        compliance: Compliance,
    ) -> Self {
        Self {
            id,
            age,
            role,
            home,
            work,
            essential,
            amenities,
            schedule,
            compliance,
            activity:         Activity::Sleep,
            position:         Point::default(),
            location:         NodeId::INVALID,
            building:         home,
            room:             0,
            work_room:        None,
            trip:             None,
            health:           HealthState::Susceptible,
            hospital:         None,
            isolating_until:  None,
            infectious_since: None,
            tested:           false,
            doses:            0,
            last_dose_day:    None,
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn is_travelling(&self) -> bool {
        self.trip.is_some()
    }

    /// `(building, room)` while inside a building.
    #[inline]
    pub fn occupancy(&self) -> Option<(BuildingId, u16)> {
        if self.trip.is_some() || self.health == HealthState::Deceased {
            None
        } else {
            Some((self.building, self.room))
        }
    }

    pub fn destination(&self) -> Option<BuildingId> {
        self.trip.as_ref().map(|t| t.destination)
    }

    #[inline]
    pub fn is_isolating(&self, now: Timestamp) -> bool {
        self.isolating_until.is_some_and(|until| now < until)
    }

    pub fn work_room(&self) -> Option<u16> {
        self.work_room
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Back to the initial state: susceptible, unvaccinated, at home.
    pub fn reset(&mut self) {
        self.activity = Activity::Sleep;
        self.work_room = None;
        self.trip = None;
        self.health = HealthState::Susceptible;
        self.hospital = None;
        self.isolating_until = None;
        self.infectious_since = None;
        self.tested = false;
        self.doses = 0;
        self.last_dose_day = None;
    }

    /// Put the individual in a random room of its home.
    pub fn place_at_home(&mut self, env: &mut Environment, rng: &mut AgentRng) {
        self.trip = None;
        self.activity = Activity::Sleep;
        self.settle(env, self.home, rng);
    }

    /// Leave the world for good (death): out of any room, off any route.
    pub fn vacate(&mut self, env: &mut Environment) {
        if self.trip.take().is_none() {
            env.building_mut(self.building).leave(self.id, self.room);
        }
    }

    /// Release the hospital bed, if any.
    pub fn discharge(&mut self, env: &mut Environment) {
        if let Some(h) = self.hospital.take() {
            env.discharge(h);
        }
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    pub(crate) fn step(
        &mut self,
        env:      &mut Environment,
        ctx:      &StepContext<'_>,
        movement: &MovementConfig,
        rng:      &mut AgentRng,
        events:   &mut MovementEvents,
    ) {
        if self.health == HealthState::Deceased {
            return;
        }
        if self.trip.is_none() {
            self.decide(env, ctx, movement, rng, events);
        }
        if self.trip.is_some() {
            self.advance(env, movement.speed_m_per_s * ctx.tick_secs as f64, rng);
        }
    }

    fn decide(
        &mut self,
        env:      &mut Environment,
        ctx:      &StepContext<'_>,
        movement: &MovementConfig,
        rng:      &mut AgentRng,
        events:   &mut MovementEvents,
    ) {
        if self.health == HealthState::SymptomaticSevere && self.hospital.is_none() {
            match self.go_to_hospital(env, rng) {
                Some(h) => {
                    events.admissions.push((self.id, h));
                    self.set_course(env, h, Activity::Hospitalisation);
                }
                None => {
                    events.refusals.push(self.id);
                    self.set_course(env, self.home, Activity::Isolation);
                }
            }
            return;
        }
        if let Some(h) = self.hospital {
            self.set_course(env, h, Activity::Hospitalisation);
            return;
        }
        if self.is_isolating(ctx.now) {
            self.set_course(env, self.home, Activity::Isolation);
            return;
        }

        let scheduled = self.schedule.activity_at(ctx.now.time_of_day());
        let target = match scheduled {
            Activity::Work => self.work_target(env, ctx.policies),
            Activity::Leisure => match self.leisure_target(env, ctx.policies, movement, rng) {
                Some(b) => b,
                None => return,
            },
            _ => self.home,
        };
        self.set_course(env, target, scheduled);
    }

    /// Try to take a bed in a hospital of the current component.
    fn go_to_hospital(&mut self, env: &mut Environment, rng: &mut AgentRng) -> Option<BuildingId> {
        let component = env.component_of(self.building);
        let hospital = env.random_hospital(component, rng)?;
        if !env.admit(hospital) {
            return None;
        }
        log::trace!("{} admitted to {hospital}", self.id);
        self.hospital = Some(hospital);
        Some(hospital)
    }

    fn locked_down(&self, policies: &ActivePolicies) -> bool {
        policies
            .lockdown
            .is_some_and(|l| Compliance::complies(self.compliance.lockdown, l.compliance))
    }

    fn work_target(&self, env: &Environment, policies: &ActivePolicies) -> BuildingId {
        match self.work {
            Some(work)
                if !env.building(work).is_closed()
                    && !(self.locked_down(policies) && !self.essential) =>
            {
                work
            }
            _ => self.home,
        }
    }

    /// `None` means stay where you are.
    fn leisure_target(
        &self,
        env:      &Environment,
        policies: &ActivePolicies,
        movement: &MovementConfig,
        rng:      &mut AgentRng,
    ) -> Option<BuildingId> {
        let at_amenity = self.activity == Activity::Leisure
            && self.amenities.contains(&self.building)
            && !env.building(self.building).is_closed();
        if at_amenity && rng.gen_bool(movement.leisure_stay_prob) {
            return None;
        }
        if let Some(l) = policies.lockdown {
            if Compliance::complies(self.compliance.lockdown, l.compliance)
                && !rng.gen_bool(l.leisure_travel)
            {
                return Some(self.home);
            }
        }
        match rng.choose(&self.amenities) {
            Some(&a) if !env.building(a).is_closed() => Some(a),
            _ => Some(self.home),
        }
    }

    /// Adopt `activity` and start a trip to `target` unless already there.
    fn set_course(&mut self, env: &mut Environment, target: BuildingId, activity: Activity) {
        self.activity = activity;
        if self.building == target {
            return;
        }
        match env.get_route(self.building, target) {
            Some(path) => {
                env.building_mut(self.building).leave(self.id, self.room);
                self.trip = Some(Trip { path, next: 0, destination: target });
            }
            None => log::debug!("{} cannot reach {target} from {}", self.id, self.building),
        }
    }

    fn advance(&mut self, env: &mut Environment, mut budget_m: f64, rng: &mut AgentRng) {
        while let Some(trip) = self.trip.as_mut() {
            let node = trip.path.node(trip.next);
            let target = env.network.position(node);
            let hop = self.position.distance(target);
            if budget_m < hop {
                self.position = self.position.lerp(target, budget_m / hop);
                return;
            }
            budget_m -= hop;
            self.position = target;
            self.location = node;
            trip.next += 1;
            if trip.next == trip.path.len() {
                let destination = trip.destination;
                self.trip = None;
                self.settle(env, destination, rng);
                return;
            }
        }
    }

    /// Enter `building`: pick a room, a position inside, and the entry node.
    fn settle(&mut self, env: &mut Environment, building: BuildingId, rng: &mut AgentRng) {
        let is_work_arrival = self.activity == Activity::Work && self.work == Some(building);
        let b = env.building_mut(building);
        self.room = if is_work_arrival {
            *self.work_room.get_or_insert_with(|| b.random_room(rng))
        } else {
            b.random_room(rng)
        };
        b.enter(self.id, self.room);
        self.building = building;
        self.position = b.random_interior_point(rng);
        self.location = b.node;
    }
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// Immutable per-individual record for rendering.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id:       AgentId,
    pub position: Point,
    pub health:   HealthState,
    pub activity: Activity,
}

impl From<&Individual> for AgentSnapshot {
    fn from(i: &Individual) -> Self {
        Self { id: i.id, position: i.position, health: i.health, activity: i.activity }
    }
}
