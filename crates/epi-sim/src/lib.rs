//! `epi-sim` — simulation coordinator for the epidemic simulator.
//!
//! # Tick order
//!
//! ```text
//! tick(now):
//!   ① Movement      — Population::step: each individual decides or continues
//!                     its trip; hospital admissions are counted.
//!   ② Disease       — Disease::step on the post-movement room occupancy.
//!   ③ Output        — SimulationOutput::step(now, occupied beds).
//!   ④ Clock         — advance one tick; on a day rollover
//!                     Interventions::step(day).
//!   ⑤ Finish        — once day ≥ duration: final output sample, FINISHED.
//! ```
//!
//! # Crate layout
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`config`]   | `SimulationConfig` (JSON, validation)                    |
//! | [`world`]    | `World` (all components), `TickReport`                   |
//! | [`sim`]      | `Simulation`, `SimState`, `WorldSnapshot`                |
//! | [`observer`] | `SimObserver`, `NoopObserver`, `OutputObserver`          |
//! | [`player`]   | `Player`: timer thread with a command channel            |
//! | [`error`]    | `SimError`, `SimResult<T>`                               |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use epi_sim::{Simulation, SimulationConfig};
//! use epi_spatial::JsonGeometryFile;
//!
//! let config = SimulationConfig::from_json_path("scenario.json".as_ref())?;
//! let mut sim = Simulation::new();
//! sim.initialise(config, &JsonGeometryFile("town.json".into()))?;
//! sim.run_to_end()?;
//! println!("{} deaths", sim.output().unwrap().cumulative_deaths());
//! ```

pub mod config;
pub mod error;
pub mod observer;
pub mod player;
pub mod sim;
pub mod world;


pub use config::SimulationConfig;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, OutputObserver, SimObserver};
pub use player::Player;
pub use sim::{SimState, Simulation, WorldSnapshot};
pub use world::{TickReport, World};
