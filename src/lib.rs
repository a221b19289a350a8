//a daily multi-symbol equity/etf signal backtester

pub mod config;
pub mod data;
pub mod engine;
pub mod indicator;
pub mod instrument;
pub mod metrics;
pub mod portfolio;
pub mod signal;
pub mod strategy;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{
        BacktestConfiguration, ConfigError, SignalParams, StrategyParams, UniverseConfig,
    };
    pub use crate::data::{load_panel_csv, FieldFrame, Frame, Panel, PanelBuilder, PanelError};
    pub use crate::engine::{
        BacktestContext, BacktestEngine, BacktestResult, ChannelConfig, Context, DailySlice,
        EngineError, ExecutionEngine, OrderRecord, OrderRequest, OrderSide, SignalRow,
    };
    pub use crate::indicator::{rolling_average, rolling_sum, IndicatorError};
    pub use crate::instrument::Security;
    pub use crate::metrics::{print_positions_table, DailySnapshot, RunSummary};
    pub use crate::portfolio::{PortfolioError, PortfolioState, Position};
    pub use crate::signal::{
        sentiment_threshold, trend_confirmation, volume_breakout, SignalError, SignalFn,
        SignalMatrix, SignalSet,
    };
    pub use crate::strategy::{DailySignalStrategy, Strategy};
}
