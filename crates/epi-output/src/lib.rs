//! `epi-output` — what the simulation reports.
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`compartment`] | `CompartmentTable`: the `(old, new)` count reducer         |
//! | [`series`]      | `SimulationOutput`, `OutputSample`, `Metric`, `OutputConfig` |
//! | [`writer`]      | `OutputWriter` trait                                       |
//! | [`csv`]         | `CsvWriter` backend                                        |
//! | [`row`]         | `AgentSnapshotRow`                                         |
//!
//! Compartment counts are never incremented or decremented directly; every
//! change goes through [`CompartmentTable::apply`], so the counts always sum
//! to the population.
//!
//! # Usage
//!
//! ```rust,ignore
//! use epi_output::{CsvWriter, OutputWriter};
//!
//! let mut writer = CsvWriter::new(Path::new("./output"))?;
//! sim.run_to_end()?;
//! writer.write_series(sim.output().unwrap())?;
//! writer.finish()?;
//! ```

pub mod compartment;
pub mod csv;
pub mod error;
pub mod row;
pub mod series;
pub mod writer;

#[cfg(test)]
mod tests;

pub use compartment::CompartmentTable;
pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use row::AgentSnapshotRow;
pub use series::{Metric, OutputConfig, OutputSample, SimulationOutput};
pub use writer::OutputWriter;
