//! The `OutputWriter` trait implemented by every output backend.

use crate::row::AgentSnapshotRow;
use crate::series::SimulationOutput;
use crate::OutputResult;

/// A sink for simulation output.
///
/// Snapshots are streamed as the run progresses; the time series are written
/// once, from the finished [`SimulationOutput`].  Implementations must be
/// `Send` so a writer can travel with the simulation onto a timer thread.
pub trait OutputWriter: Send {
    /// Write a batch of agent snapshot rows.
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()>;

    /// Write every recorded series.
    fn write_series(&mut self, output: &SimulationOutput) -> OutputResult<()>;

    /// Flush and close.  Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
