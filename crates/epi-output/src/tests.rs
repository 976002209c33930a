//! Unit tests for epi-output.

#[cfg(test)]
mod compartments {
    use epi_core::HealthState::*;

    use crate::CompartmentTable;

    #[test]
    fn apply_moves_one_individual() {
        let mut t = CompartmentTable::new(10);
        t.apply(Susceptible, Exposed);
        t.apply(Exposed, Infectious);
        t.apply(Susceptible, Exposed);
        assert_eq!(t[Susceptible], 8);
        assert_eq!(t.get(Exposed), 1);
        assert_eq!(t.get(Infectious), 1);
        assert_eq!(t.active_cases(), 2);
        assert_eq!(t.total(), 10);
    }

    #[test]
    #[should_panic(expected = "would go negative")]
    fn empty_compartment_panics() {
        let mut t = CompartmentTable::new(3);
        t.apply(Recovered, Susceptible);
    }
}

#[cfg(test)]
mod series {
    use epi_core::{HealthState::*, Timestamp};

    use crate::{Metric, OutputConfig, SimulationOutput};

    fn output(population: u32) -> SimulationOutput {
        SimulationOutput::new(
            population,
            OutputConfig { incidence_period_secs: 100, sample_interval_secs: 50 },
        )
    }

    #[test]
    fn counters_follow_transitions() {
        let mut out = output(5);
        out.record_transition(Susceptible, Infectious);
        out.record_transition(Susceptible, Exposed);
        out.record_transition(Infectious, SymptomaticMild);
        out.record_transition(SymptomaticMild, SymptomaticSevere);
        out.record_transition(SymptomaticSevere, Deceased);
        out.record_admissions(1);

        assert_eq!(out.cumulative_cases(), 2);
        assert_eq!(out.cumulative_deaths(), 1);
        assert_eq!(out.cumulative_admissions(), 1);
        assert_eq!(out.counts().get(Deceased), 1);
        assert_eq!(out.counts().total(), 5);
    }

    #[test]
    fn self_transition_is_ignored() {
        let mut out = output(2);
        out.record_transition(Susceptible, Susceptible);
        assert_eq!(out.cumulative_cases(), 0);
        assert_eq!(out.counts().get(Susceptible), 2);
    }

    #[test]
    fn samples_on_interval() {
        let mut out = output(4);
        for t in (0..=200).step_by(10) {
            out.step(Timestamp(t), 0);
        }
        let stamps: Vec<u64> = out.samples().iter().map(|s| s.timestamp.0).collect();
        assert_eq!(stamps, vec![0, 50, 100, 150, 200]);
        assert!(out.samples().iter().all(|s| s.states.iter().sum::<u32>() == 4));
    }

    #[test]
    fn incidence_buckets_by_period() {
        let mut out = output(10);
        out.step(Timestamp(0), 0);
        out.record_transition(Susceptible, Exposed);
        out.step(Timestamp(40), 0);
        out.record_transition(Susceptible, Exposed);
        out.record_transition(Susceptible, Exposed);
        // Recorded in the tick at t = 100: both belong to the second bucket.
        out.step(Timestamp(100), 0);
        out.record_transition(Susceptible, Exposed);
        out.step(Timestamp(250), 0);

        assert_eq!(out.incidence(), &[(Timestamp(0), 1), (Timestamp(100), 2)]);

        out.finish(Timestamp(260), 0);
        assert_eq!(out.incidence().last(), Some(&(Timestamp(200), 1)));
        let total: u32 = out.incidence().iter().map(|&(_, n)| n).sum();
        assert_eq!(total, out.cumulative_cases());
    }

    #[test]
    fn finish_adds_last_sample_once() {
        let mut out = output(3);
        out.step(Timestamp(0), 0);
        out.finish(Timestamp(30), 2);
        out.finish(Timestamp(30), 2);
        assert_eq!(out.samples().len(), 2);
        assert_eq!(out.series(Metric::Hospitalised), vec![(Timestamp(0), 0), (Timestamp(30), 2)]);
    }

    #[test]
    fn doses_per_number() {
        let mut out = output(3);
        out.record_dose(1);
        out.record_dose(1);
        out.record_dose(2);
        out.step(Timestamp(0), 0);
        assert_eq!(out.doses_given(1), 2);
        assert_eq!(out.doses_given(2), 1);
        assert_eq!(out.doses_given(3), 0);
        assert_eq!(out.max_dose(), 2);
        assert_eq!(out.series(Metric::Dose(1)), vec![(Timestamp(0), 2)]);
        assert_eq!(out.series(Metric::Dose(0)), vec![(Timestamp(0), 0)]);
    }

    #[test]
    fn reset_clears_everything() {
        let mut out = output(3);
        out.record_transition(Susceptible, Exposed);
        out.record_dose(1);
        out.step(Timestamp(0), 1);
        out.reset(7);
        assert!(out.samples().is_empty());
        assert!(out.incidence().is_empty());
        assert_eq!(out.cumulative_cases(), 0);
        assert_eq!(out.max_dose(), 0);
        assert_eq!(out.counts().get(Susceptible), 7);
        assert_eq!(out.config().sample_interval_secs, 50);
    }
}

#[cfg(test)]
mod csv_tests {
    use epi_core::{HealthState, Timestamp};
    use tempfile::TempDir;

    use crate::{AgentSnapshotRow, CsvWriter, OutputConfig, OutputWriter, SimulationOutput};

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn headers(path: std::path::PathBuf) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("agent_snapshots.csv").exists());
        assert!(dir.path().join("timeseries.csv").exists());
        assert!(dir.path().join("incidence.csv").exists());
    }

    #[test]
    fn snapshot_rows() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let row = AgentSnapshotRow {
            agent_id:  3,
            timestamp: Timestamp::from_day_time(2, 60),
            x:         1.5,
            y:         -2.25,
            health:    HealthState::SymptomaticMild,
            activity:  "WORK",
        };
        w.write_snapshots(&[row]).unwrap();
        w.write_snapshots(&[]).unwrap();
        w.finish().unwrap();

        assert_eq!(
            headers(dir.path().join("agent_snapshots.csv")),
            ["agent_id", "timestamp", "day", "x", "y", "health", "activity"]
        );
        let mut rdr = csv::Reader::from_path(dir.path().join("agent_snapshots.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][2], "2");
        assert_eq!(&rows[0][4], "-2.250");
        assert_eq!(&rows[0][5], "symptomatic_mild");
    }

    #[test]
    fn series_columns_include_doses() {
        let dir = tmp();
        let mut out = SimulationOutput::new(4, OutputConfig::default());
        out.record_transition(HealthState::Susceptible, HealthState::Infectious);
        out.record_dose(1);
        out.record_dose(2);
        out.step(Timestamp(0), 0);
        out.finish(Timestamp::from_day_time(1, 0), 0);

        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_series(&out).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();

        let h = headers(dir.path().join("timeseries.csv"));
        assert_eq!(h.len(), 2 + 8 + 5 + 2);
        assert_eq!(h[2], "susceptible");
        assert_eq!(h.last().map(String::as_str), Some("dose_2"));

        let mut rdr = csv::Reader::from_path(dir.path().join("timeseries.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][2], "3"); // susceptible
        assert_eq!(&rows[0][4], "1"); // infectious

        let mut rdr = csv::Reader::from_path(dir.path().join("incidence.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][2], "1");
    }
}
