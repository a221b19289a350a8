pub mod backtest;
pub mod context;
pub mod current;
pub mod execution;

pub use backtest::{BacktestContext, BacktestEngine, BacktestResult};
pub use context::{ChannelConfig, Context, EngineError};
pub use current::{DailySlice, SignalRow};
pub use execution::{ExecutionEngine, OrderRecord, OrderRequest, OrderSide};
