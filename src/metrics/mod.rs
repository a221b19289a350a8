pub mod summary;
pub mod timeseries;

pub use summary::{print_positions_table, RunSummary};
pub use timeseries::{max_drawdown, DailySnapshot, SnapshotRecorder};
