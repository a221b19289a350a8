use crate::data::PanelError;
use crate::engine::execution::OrderRequest;
use crate::instrument::Security;
use crate::portfolio::{PortfolioError, PortfolioState};
use crate::signal::{SignalError, SignalFn};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Portfolio(#[from] PortfolioError),
    #[error(transparent)]
    Panel(#[from] PanelError),
    #[error("signal {name} failed: {source}")]
    Signal {
        name: String,
        #[source]
        source: SignalError,
    },
    #[error("signal or channel {0} registered twice")]
    DuplicateSignal(String),
    #[error("market {0} configured twice")]
    DuplicateChannel(String),
    #[error("{0} is not part of the configured universe")]
    UnknownSecurity(String),
    #[error("orders can only be submitted while a trading day is open")]
    NotRunning,
}

//what a strategy subscribes to: one market's symbols and the panel fields it reads
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelConfig {
    pub market: String,
    pub symbols: Vec<String>,
    pub fields: Vec<String>,
}

//everything a strategy may touch while initializing and trading
pub trait Context {
    fn configure(&mut self, channel: ChannelConfig) -> Result<(), EngineError>;

    fn register_signal(&mut self, name: &str, signal: SignalFn) -> Result<(), EngineError>;

    fn security(&self, symbol: &str) -> Option<&Security>;

    fn portfolio(&self) -> &PortfolioState;

    //sizes and executes an order at the current mark; returns the new amount
    fn submit(
        &mut self,
        symbol: &str,
        request: OrderRequest,
        comment: &str,
    ) -> Result<i64, EngineError>;

    //last marked price
    fn quote(&self, symbol: &str) -> Option<f64> {
        self.portfolio().price(symbol)
    }

    fn order(&mut self, symbol: &str, units: i64, comment: &str) -> Result<i64, EngineError> {
        self.submit(symbol, OrderRequest::Units(units), comment)
    }

    fn order_value(&mut self, symbol: &str, value: f64, comment: &str) -> Result<i64, EngineError> {
        self.submit(symbol, OrderRequest::Value(value), comment)
    }

    fn order_percent(
        &mut self,
        symbol: &str,
        percent: f64,
        comment: &str,
    ) -> Result<i64, EngineError> {
        self.submit(symbol, OrderRequest::Percent(percent), comment)
    }

    fn order_target(
        &mut self,
        symbol: &str,
        units: i64,
        comment: &str,
    ) -> Result<i64, EngineError> {
        self.submit(symbol, OrderRequest::TargetUnits(units), comment)
    }

    fn order_target_value(
        &mut self,
        symbol: &str,
        value: f64,
        comment: &str,
    ) -> Result<i64, EngineError> {
        self.submit(symbol, OrderRequest::TargetValue(value), comment)
    }

    fn order_target_percent(
        &mut self,
        symbol: &str,
        percent: f64,
        comment: &str,
    ) -> Result<i64, EngineError> {
        self.submit(symbol, OrderRequest::TargetPercent(percent), comment)
    }
}
