//! Simulation observers: state-change notifications, per-tick and per-day
//! hooks, and the bridge to an [`OutputWriter`].

use epi_intervention::InterventionChanges;
use epi_output::{AgentSnapshotRow, OutputError, OutputResult, OutputWriter};

use crate::{SimError, SimState, TickReport, World};

/// Callbacks invoked by [`Simulation`](crate::Simulation) as it runs.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  Observers must be `Send` so the
/// simulation can be moved onto a [`Player`](crate::Player) thread.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct Progress;
///
/// impl SimObserver for Progress {
///     fn on_day(&mut self, day: u32, _changes: &InterventionChanges, world: &World) {
///         println!("day {day}: {} active cases", world.output().counts().active_cases());
///     }
/// }
/// ```
pub trait SimObserver: Send {
    /// Called on every state transition, including a reset back to
    /// `Initialised`.
    fn on_state_change(&mut self, _from: SimState, _to: SimState) {}

    /// Called after every tick.
    fn on_tick_end(&mut self, _report: &TickReport, _world: &World) {}

    /// Called when a tick rolls the day over, after interventions for the
    /// new day have been applied.
    fn on_day(&mut self, _day: u32, _changes: &InterventionChanges, _world: &World) {}

    /// Called once when the run reaches its duration.
    fn on_finish(&mut self, _world: &World) {}

    /// A deferred error, collected after a run.  Hooks have no return value,
    /// so observers that can fail store their first error here.
    fn take_error(&mut self) -> Option<SimError> {
        None
    }
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

// ── OutputObserver ────────────────────────────────────────────────────────────

/// Streams agent snapshots to an [`OutputWriter`] every `snapshot_every`
/// ticks and writes the full series when the run finishes.
///
/// Errors from the writer are stored internally; the simulation collects
/// them through [`SimObserver::take_error`].
pub struct OutputObserver<W: OutputWriter> {
    writer:         W,
    snapshot_every: u64,
    ticks:          u64,
    last_error:     Option<OutputError>,
}

impl<W: OutputWriter> OutputObserver<W> {
    /// `snapshot_every = 0` disables snapshots.
    pub fn new(writer: W, snapshot_every: u64) -> Self {
        Self { writer, snapshot_every, ticks: 0, last_error: None }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for OutputObserver<W> {
    fn on_state_change(&mut self, _from: SimState, to: SimState) {
        if to == SimState::Initialised {
            self.ticks = 0;
        }
    }

    fn on_tick_end(&mut self, report: &TickReport, world: &World) {
        let due = self.snapshot_every > 0 && self.ticks % self.snapshot_every == 0;
        self.ticks += 1;
        if !due {
            return;
        }
        let rows: Vec<AgentSnapshotRow> = world
            .population()
            .individuals()
            .iter()
            .map(|i| AgentSnapshotRow {
                agent_id:  i.id.0,
                timestamp: report.now,
                x:         i.position.x,
                y:         i.position.y,
                health:    i.health,
                activity:  i.activity.as_str(),
            })
            .collect();
        let result = self.writer.write_snapshots(&rows);
        self.store_err(result);
    }

    fn on_finish(&mut self, world: &World) {
        let result = self.writer.write_series(world.output());
        self.store_err(result);
        let result = self.writer.finish();
        self.store_err(result);
    }

    fn take_error(&mut self) -> Option<SimError> {
        self.last_error.take().map(SimError::from)
    }
}
