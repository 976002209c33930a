//! town — headless run of the epidemic simulator on a synthetic town.
//!
//! ```text
//! town                              built-in scenario on the synthetic town
//! town <config.json>                custom scenario on the synthetic town
//! town <config.json> <geometry.json>
//! town --export-geometry <path>     write the synthetic town as JSON and exit
//! ```
//!
//! Output CSVs go to `output/town/`.  Set `RUST_LOG=debug` for per-day
//! detail.

mod town;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use epi_core::{DAY_SECS, HealthState};
use epi_intervention::{InterventionChanges, InterventionKind, InterventionParam};
use epi_output::CsvWriter;
use epi_sim::{OutputObserver, SimObserver, Simulation, SimulationConfig, World};
use epi_spatial::Geometry;

use town::build_town;

const OUTPUT_DIR:   &str = "output/town";
const REPORT_EVERY: u32  = 5; // days

// ── Scenario ──────────────────────────────────────────────────────────────────

fn default_config() -> SimulationConfig {
    let mut config = SimulationConfig {
        seed:             42,
        tick_secs:        600,
        duration_days:    60,
        initial_infected: 10,
        ..SimulationConfig::default()
    };
    config.population.size = 2_000;
    config.interventions = vec![
        InterventionParam::new(InterventionKind::Testing, 5, 60),
        InterventionParam::new(InterventionKind::ContactTracing, 5, 60),
        InterventionParam::new(InterventionKind::Masks, 10, 40).with("compliance", 0.7),
        InterventionParam::new(InterventionKind::SchoolClosure, 15, 45),
        InterventionParam::new(InterventionKind::Vaccination, 30, 60).with("doses_per_day", 40.0),
    ];
    config
}

// ── Progress observer ─────────────────────────────────────────────────────────

struct DailyReport;

impl SimObserver for DailyReport {
    fn on_day(&mut self, day: u32, changes: &InterventionChanges, world: &World) {
        for kind in &changes.activated {
            println!("day {day:>3}: {kind} in force");
        }
        for kind in &changes.deactivated {
            println!("day {day:>3}: {kind} lifted");
        }
        if day % REPORT_EVERY != 0 {
            return;
        }
        let out = world.output();
        let c = out.counts();
        println!(
            "day {day:>3}: S {:>5}  E {:>4}  I {:>4}  A {:>4}  M {:>4}  SV {:>3}  R {:>5}  D {:>3}  | beds {:>3}  doses {:>5}",
            c[HealthState::Susceptible],
            c[HealthState::Exposed],
            c[HealthState::Infectious],
            c[HealthState::Asymptomatic],
            c[HealthState::SymptomaticMild],
            c[HealthState::SymptomaticSevere],
            c[HealthState::Recovered],
            c[HealthState::Deceased],
            world.environment().occupied_beds(),
            out.doses_given(1),
        );
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let [flag, path] = args.as_slice() {
        if flag == "--export-geometry" {
            let file = File::create(path).with_context(|| format!("creating {path}"))?;
            serde_json::to_writer(BufWriter::new(file), &build_town())?;
            println!("synthetic town written to {path}");
            return Ok(());
        }
    }

    let config = match args.first() {
        Some(path) => SimulationConfig::from_json_path(Path::new(path))
            .with_context(|| format!("loading scenario {path}"))?,
        None => default_config(),
    };
    let geometry = match args.get(1) {
        Some(path) => Geometry::from_json_path(Path::new(path))
            .with_context(|| format!("loading geometry {path}"))?,
        None => build_town(),
    };

    println!("=== town: agent-based epidemic simulation ===");
    println!(
        "Individuals: {}  |  Buildings: {}  |  Days: {}  |  Tick: {} s  |  Seed: {}",
        config.population.size,
        geometry.buildings.len(),
        config.duration_days,
        config.tick_secs,
        config.seed,
    );
    println!();

    let snapshot_every = (DAY_SECS / config.tick_secs.max(1)) as u64;
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;

    let mut sim = Simulation::new();
    sim.add_observer(DailyReport);
    sim.add_observer(OutputObserver::new(writer, snapshot_every));
    sim.initialise(config, &geometry)?;

    let t0 = Instant::now();
    sim.run_to_end()?;
    let elapsed = t0.elapsed();

    let out = sim.output().context("simulation has no output")?;
    println!();
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("{:<20} {:>8}", "Compartment", "Count");
    println!("{}", "-".repeat(29));
    for state in HealthState::ALL {
        println!("{:<20} {:>8}", state.as_str(), out.counts()[state]);
    }
    println!("{}", "-".repeat(29));
    println!("{:<20} {:>8}", "cumulative cases", out.cumulative_cases());
    println!("{:<20} {:>8}", "admissions", out.cumulative_admissions());
    println!("{:<20} {:>8}", "deaths", out.cumulative_deaths());
    for dose in 1..=out.max_dose() {
        println!("{:<20} {:>8}", format!("dose {dose}"), out.doses_given(dose));
    }
    println!();
    println!("CSV output in {OUTPUT_DIR}/");
    Ok(())
}
