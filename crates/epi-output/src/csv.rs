//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `agent_snapshots.csv`: one row per individual per snapshot
//! - `timeseries.csv`:      one row per [`OutputSample`](crate::OutputSample)
//! - `incidence.csv`:       one row per closed incidence bucket

use std::fs::File;
use std::path::Path;

use csv::Writer;

use epi_core::HealthState;

use crate::row::AgentSnapshotRow;
use crate::series::SimulationOutput;
use crate::writer::OutputWriter;
use crate::OutputResult;

/// Writes simulation output to CSV files.
pub struct CsvWriter {
    snapshots:  Writer<File>,
    timeseries: Writer<File>,
    incidence:  Writer<File>,
    finished:   bool,
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir`.  The snapshot header is
    /// written immediately; the series headers depend on the highest dose
    /// recorded and are written by `write_series`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut snapshots = Writer::from_path(dir.join("agent_snapshots.csv"))?;
        snapshots.write_record(["agent_id", "timestamp", "day", "x", "y", "health", "activity"])?;

        Ok(Self {
            snapshots,
            timeseries: Writer::from_path(dir.join("timeseries.csv"))?,
            incidence:  Writer::from_path(dir.join("incidence.csv"))?,
            finished:   false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.agent_id.to_string(),
                row.timestamp.0.to_string(),
                row.timestamp.day().to_string(),
                format!("{:.3}", row.x),
                format!("{:.3}", row.y),
                row.health.as_str().to_owned(),
                row.activity.to_owned(),
            ])?;
        }
        Ok(())
    }

    fn write_series(&mut self, output: &SimulationOutput) -> OutputResult<()> {
        let doses = output.max_dose();

        let mut header: Vec<String> = vec!["timestamp".into(), "day".into()];
        header.extend(HealthState::ALL.iter().map(|s| s.as_str().to_owned()));
        header.extend(
            [
                "prevalent",
                "cumulative_cases",
                "hospitalised",
                "cumulative_admissions",
                "cumulative_deaths",
            ]
            .map(str::to_owned),
        );
        header.extend((1..=doses).map(|n| format!("dose_{n}")));
        self.timeseries.write_record(&header)?;

        for s in output.samples() {
            let mut record: Vec<String> = vec![s.timestamp.0.to_string(), s.timestamp.day().to_string()];
            record.extend(s.states.iter().map(u32::to_string));
            record.extend(
                [
                    s.prevalent,
                    s.cumulative_cases,
                    s.hospitalised,
                    s.cumulative_admissions,
                    s.cumulative_deaths,
                ]
                .map(|v| v.to_string()),
            );
            record.extend((0..doses as usize).map(|k| s.doses.get(k).copied().unwrap_or(0).to_string()));
            self.timeseries.write_record(&record)?;
        }

        self.incidence.write_record(["bucket_start", "day", "new_cases"])?;
        for (start, cases) in output.incidence() {
            self.incidence.write_record(&[
                start.0.to_string(),
                start.day().to_string(),
                cases.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.timeseries.flush()?;
        self.incidence.flush()?;
        Ok(())
    }
}
