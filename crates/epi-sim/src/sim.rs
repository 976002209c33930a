//! The `Simulation` coordinator and its state machine.

use std::fmt;
use std::time::Duration;

use epi_agent::AgentSnapshot;
use epi_core::Timestamp;
use epi_intervention::InterventionKind;
use epi_output::{CompartmentTable, SimulationOutput};
use epi_spatial::GeometrySource;

use crate::{SimError, SimObserver, SimResult, SimulationConfig, TickReport, World};

// ── SimState ──────────────────────────────────────────────────────────────────

/// ```text
/// UNINITIALISED ──initialise──▶ INITIALISED ──play──▶ PLAYING ⇄ PAUSED
///                                                        │
///                                                  day ≥ duration
///                                                        ▼
///                                                     FINISHED
///
/// reset: any state with a world ──▶ INITIALISED
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum SimState {
    Uninitialised,
    Initialised,
    Playing,
    Paused,
    Finished,
}

impl SimState {
    pub fn as_str(self) -> &'static str {
        match self {
            SimState::Uninitialised => "UNINITIALISED",
            SimState::Initialised   => "INITIALISED",
            SimState::Playing       => "PLAYING",
            SimState::Paused        => "PAUSED",
            SimState::Finished      => "FINISHED",
        }
    }
}

impl fmt::Display for SimState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── WorldSnapshot ─────────────────────────────────────────────────────────────

/// An immutable copy of everything a renderer draws: positions and health
/// for the map, the accumulated series for the charts.
#[derive(Clone, Debug)]
pub struct WorldSnapshot {
    pub state:                SimState,
    pub timestamp:            Timestamp,
    pub agents:               Vec<AgentSnapshot>,
    pub counts:               CompartmentTable,
    pub hospitalised:         u32,
    pub active_interventions: Vec<InterventionKind>,
    pub output:               SimulationOutput,
}

impl WorldSnapshot {
    fn capture(state: SimState, world: &World) -> Self {
        let interventions = world.interventions();
        let mut active = Vec::new();
        for p in interventions.params() {
            if interventions.is_active(p.kind) && !active.contains(&p.kind) {
                active.push(p.kind);
            }
        }
        Self {
            state,
            timestamp:            world.now(),
            agents:               world.population().snapshot(),
            counts:               *world.output().counts(),
            hospitalised:         world.environment().occupied_beds(),
            active_interventions: active,
            output:               world.output().clone(),
        }
    }
}

// ── Simulation ────────────────────────────────────────────────────────────────

/// Owns one world and drives it tick by tick.
///
/// `Simulation` itself never sleeps: [`step`](Self::step) runs exactly one
/// tick, [`run_to_end`](Self::run_to_end) runs headless until the duration is
/// reached, and a [`Player`](crate::Player) supplies the timer for
/// interactive use.
pub struct Simulation {
    state:     SimState,
    config:    Option<SimulationConfig>,
    world:     Option<World>,
    /// Speed multiplier applied to the base tick interval.
    speed:     f64,
    observers: Vec<Box<dyn SimObserver>>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulation {
    pub fn new() -> Self {
        Self {
            state:     SimState::Uninitialised,
            config:    None,
            world:     None,
            speed:     1.0,
            observers: Vec::new(),
        }
    }

    pub fn add_observer<O: SimObserver + 'static>(&mut self, observer: O) {
        self.observers.push(Box::new(observer));
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Validate `config`, load the geometry and build a fresh world.
    ///
    /// The current world is replaced only on success; any failure leaves the
    /// simulation exactly as it was.
    pub fn initialise(&mut self, config: SimulationConfig, source: &dyn GeometrySource) -> SimResult<()> {
        config.validate()?;
        let geometry = source.load()?;
        let world = World::build(&config, &geometry)?;
        self.world = Some(world);
        self.config = Some(config);
        self.set_state(SimState::Initialised);
        Ok(())
    }

    pub fn play(&mut self) -> SimResult<()> {
        match self.state {
            SimState::Initialised | SimState::Paused => {
                self.set_state(SimState::Playing);
                Ok(())
            }
            SimState::Playing => Ok(()),
            state => Err(SimError::InvalidTransition { state, action: "play" }),
        }
    }

    pub fn pause(&mut self) -> SimResult<()> {
        match self.state {
            SimState::Playing => {
                self.set_state(SimState::Paused);
                Ok(())
            }
            SimState::Paused => Ok(()),
            state => Err(SimError::InvalidTransition { state, action: "pause" }),
        }
    }

    /// Return the world to day 0 without rebuilding it.
    pub fn reset(&mut self) -> SimResult<()> {
        let Some(world) = self.world.as_mut() else {
            return Err(SimError::InvalidTransition { state: self.state, action: "reset" });
        };
        world.reset()?;
        self.set_state(SimState::Initialised);
        Ok(())
    }

    pub fn set_speed(&mut self, multiplier: f64) -> SimResult<()> {
        if !(multiplier > 0.0 && multiplier.is_finite()) {
            return Err(SimError::Config(format!("speed multiplier {multiplier} must be positive")));
        }
        log::debug!("speed set to {multiplier}x");
        self.speed = multiplier;
        Ok(())
    }

    /// Run one tick and notify observers.
    ///
    /// Allowed in every state that has a world, except `Finished`.  An error
    /// stored by an observer during the tick is returned after the tick has
    /// been applied.
    pub fn step(&mut self) -> SimResult<TickReport> {
        let state = self.state;
        let world = match self.world.as_mut() {
            Some(world) if state != SimState::Finished => world,
            _ => return Err(SimError::InvalidTransition { state, action: "step" }),
        };

        let report = world.tick();
        let world = &*world;
        for o in &mut self.observers {
            o.on_tick_end(&report, world);
        }
        if let Some(changes) = &report.day_changes {
            let day = world.clock().day;
            for o in &mut self.observers {
                o.on_day(day, changes, world);
            }
        }
        if report.finished {
            for o in &mut self.observers {
                o.on_finish(world);
            }
            log::info!(
                "finished at {}: {} cumulative cases, {} deaths",
                world.now(),
                world.output().cumulative_cases(),
                world.output().cumulative_deaths(),
            );
            self.set_state(SimState::Finished);
        }

        for o in &mut self.observers {
            if let Some(e) = o.take_error() {
                return Err(e);
            }
        }
        Ok(report)
    }

    /// Tick without a timer until the duration is reached.
    pub fn run_to_end(&mut self) -> SimResult<()> {
        while self.state != SimState::Finished {
            self.step()?;
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn config(&self) -> Option<&SimulationConfig> {
        self.config.as_ref()
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    pub fn output(&self) -> Option<&SimulationOutput> {
        self.world.as_ref().map(World::output)
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Wall-clock period between two ticks: the base interval divided by
    /// the speed multiplier.
    pub fn tick_interval(&self) -> Duration {
        let base = self
            .config
            .as_ref()
            .map_or_else(|| SimulationConfig::default().base_interval(), SimulationConfig::base_interval);
        base.div_f64(self.speed)
    }

    pub fn snapshot(&self) -> SimResult<WorldSnapshot> {
        match &self.world {
            Some(world) => Ok(WorldSnapshot::capture(self.state, world)),
            None => Err(SimError::InvalidTransition { state: self.state, action: "snapshot" }),
        }
    }

    fn set_state(&mut self, to: SimState) {
        let from = std::mem::replace(&mut self.state, to);
        log::info!("simulation {from} → {to}");
        for o in &mut self.observers {
            o.on_state_change(from, to);
        }
    }
}
