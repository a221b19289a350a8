pub mod daily_signals;

use crate::engine::{Context, DailySlice, EngineError};
use chrono::NaiveDate;

pub use daily_signals::DailySignalStrategy;

//strategy interface that all strategies must implement
pub trait Strategy: Send {
    //called once before the first day: declare the universe and register signals
    fn initialize(&mut self, ctx: &mut dyn Context) -> Result<(), EngineError>;

    //called once per trading day, dates ascending
    fn handle_signals(
        &mut self,
        ctx: &mut dyn Context,
        date: NaiveDate,
        current: &DailySlice,
    ) -> Result<(), EngineError>;

    //returns the strategy name
    fn name(&self) -> &str;
}
