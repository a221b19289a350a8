use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

//end-of-day state of the book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub date: NaiveDate,
    pub cash: f64,
    pub positions_value: f64,
    pub portfolio_value: f64,
    //orders executed on this date
    pub orders: usize,
    //fall from the running peak of portfolio value
    pub drawdown: f64,
    //change in portfolio value against the previous day
    pub returns: f64,
}

//accumulates snapshots day by day, tracking peak and previous value
#[derive(Debug, Clone)]
pub struct SnapshotRecorder {
    peak: f64,
    prev_value: f64,
    snapshots: Vec<DailySnapshot>,
}

impl SnapshotRecorder {
    pub fn new(initial_value: f64) -> Self {
        SnapshotRecorder {
            peak: initial_value,
            prev_value: initial_value,
            snapshots: Vec::new(),
        }
    }

    pub fn record(&mut self, date: NaiveDate, cash: f64, positions_value: f64, orders: usize) {
        let portfolio_value = cash + positions_value;

        if portfolio_value > self.peak {
            self.peak = portfolio_value;
        }

        let drawdown = if self.peak > 0.0 {
            (self.peak - portfolio_value) / self.peak
        } else {
            0.0
        };

        let returns = if self.prev_value != 0.0 {
            (portfolio_value - self.prev_value) / self.prev_value
        } else {
            0.0
        };

        self.snapshots.push(DailySnapshot {
            date,
            cash,
            positions_value,
            portfolio_value,
            orders,
            drawdown,
            returns,
        });
        self.prev_value = portfolio_value;
    }

    pub fn snapshots(&self) -> &[DailySnapshot] {
        &self.snapshots
    }

    pub fn into_snapshots(self) -> Vec<DailySnapshot> {
        self.snapshots
    }
}

//largest drawdown over the run
pub fn max_drawdown(snapshots: &[DailySnapshot]) -> f64 {
    snapshots.iter().map(|s| s.drawdown).fold(0.0, f64::max)
}
