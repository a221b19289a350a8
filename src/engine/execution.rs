use crate::instrument::Security;
use crate::portfolio::{PortfolioError, PortfolioState};
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

//order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    //side of a signed share delta, none for zero
    pub fn from_delta(delta: i64) -> Option<Self> {
        match delta.signum() {
            1 => Some(OrderSide::Buy),
            -1 => Some(OrderSide::Sell),
            _ => None,
        }
    }
}

//how an order is sized
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OrderRequest {
    //signed share delta
    Units(i64),
    //signed currency delta
    Value(f64),
    //signed fraction of portfolio value
    Percent(f64),
    //resulting share count
    TargetUnits(i64),
    //resulting position value
    TargetValue(f64),
    //resulting fraction of portfolio value
    TargetPercent(f64),
}

impl OrderRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            OrderRequest::Units(_) => "units",
            OrderRequest::Value(_) => "value",
            OrderRequest::Percent(_) => "percent",
            OrderRequest::TargetUnits(_) => "target_units",
            OrderRequest::TargetValue(_) => "target_value",
            OrderRequest::TargetPercent(_) => "target_percent",
        }
    }

    //the number the caller asked for, in the request's own unit
    pub fn requested(&self) -> f64 {
        match *self {
            OrderRequest::Units(n) | OrderRequest::TargetUnits(n) => n as f64,
            OrderRequest::Value(v)
            | OrderRequest::Percent(v)
            | OrderRequest::TargetValue(v)
            | OrderRequest::TargetPercent(v) => v,
        }
    }

    //signed share delta for this request; value and percent sizing rounds
    //toward zero onto the security's lot, so targets are never overshot
    pub fn resolve(
        &self,
        held: i64,
        price: Option<f64>,
        portfolio_value: f64,
        security: &Security,
    ) -> Result<i64, PortfolioError> {
        let delta = match *self {
            OrderRequest::Units(n) => Some(n),
            OrderRequest::TargetUnits(target) => target.checked_sub(held),
            OrderRequest::Value(value) => {
                security.round_to_unit(value / require_price(price, security)?)
            }
            OrderRequest::Percent(pct) => {
                security.round_to_unit(pct * portfolio_value / require_price(price, security)?)
            }
            OrderRequest::TargetValue(value) => {
                let price = require_price(price, security)?;
                security.round_to_unit((value - held as f64 * price) / price)
            }
            OrderRequest::TargetPercent(pct) => {
                let price = require_price(price, security)?;
                security.round_to_unit((pct * portfolio_value - held as f64 * price) / price)
            }
        };
        delta.ok_or_else(|| PortfolioError::QuantityOverflow {
            symbol: security.symbol().to_string(),
        })
    }
}

impl fmt::Display for OrderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.requested())
    }
}

fn require_price(price: Option<f64>, security: &Security) -> Result<f64, PortfolioError> {
    price.ok_or_else(|| PortfolioError::NoPrice {
        symbol: security.symbol().to_string(),
    })
}

//audit record of an executed order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: u64,
    pub date: NaiveDate,
    pub symbol: String,
    pub kind: String,
    pub requested: f64,
    //signed shares actually moved
    pub quantity: i64,
    pub side: Option<OrderSide>,
    pub price: Option<f64>,
    pub amount_after: i64,
    pub comment: String,
}

//resolves order requests against the portfolio and keeps the audit log
#[derive(Debug, Default)]
pub struct ExecutionEngine {
    next_order_id: u64,
    log: Vec<OrderRecord>,
}

impl ExecutionEngine {
    pub fn new() -> Self {
        ExecutionEngine {
            next_order_id: 1,
            log: Vec::new(),
        }
    }

    //sizes the request, applies it and records it; returns the new amount.
    //a rejected order leaves both the portfolio and the log untouched
    pub fn execute(
        &mut self,
        portfolio: &mut PortfolioState,
        security: &Security,
        date: NaiveDate,
        request: OrderRequest,
        comment: &str,
    ) -> Result<i64, PortfolioError> {
        let symbol = security.symbol();
        let held = portfolio.amount(symbol);
        let price = portfolio.price(symbol);

        let delta = request.resolve(held, price, portfolio.portfolio_value(), security)?;
        let amount_after = portfolio.order(symbol, delta)?;

        let id = self.next_order_id.max(1);
        self.next_order_id = id + 1;

        debug!(
            "order #{} {} {} -> {:+} shares (now {}) [{}]",
            id, symbol, request, delta, amount_after, comment
        );

        self.log.push(OrderRecord {
            id,
            date,
            symbol: symbol.to_string(),
            kind: request.kind().to_string(),
            requested: request.requested(),
            quantity: delta,
            side: OrderSide::from_delta(delta),
            price,
            amount_after,
            comment: comment.to_string(),
        });

        Ok(amount_after)
    }

    pub fn orders(&self) -> &[OrderRecord] {
        &self.log
    }

    pub fn into_orders(self) -> Vec<OrderRecord> {
        self.log
    }
}
