use crate::portfolio::position::Position;
use indexmap::IndexMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortfolioError {
    #[error("order of {delta} on {symbol} would leave a short position (held {held})")]
    NegativePosition {
        symbol: String,
        held: i64,
        delta: i64,
    },
    #[error("no price has been marked for {symbol}")]
    NoPrice { symbol: String },
    #[error("order size on {symbol} is out of range")]
    QuantityOverflow { symbol: String },
}

//cash plus positions, valued at the last marked prices
#[derive(Debug, Clone)]
pub struct PortfolioState {
    starting_cash: f64,
    cash: f64,

    //insertion order = first successful order per symbol
    positions: IndexMap<String, Position>,

    //last marked price per symbol
    prices: IndexMap<String, f64>,
}

impl PortfolioState {
    pub fn new(starting_cash: f64) -> Self {
        PortfolioState {
            starting_cash,
            cash: starting_cash,
            positions: IndexMap::new(),
            prices: IndexMap::new(),
        }
    }

    pub fn starting_cash(&self) -> f64 {
        self.starting_cash
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn positions(&self) -> &IndexMap<String, Position> {
        &self.positions
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    //zero for symbols never traded
    pub fn amount(&self, symbol: &str) -> i64 {
        self.positions.get(symbol).map_or(0, |p| p.amount)
    }

    pub fn price(&self, symbol: &str) -> Option<f64> {
        self.prices.get(symbol).copied()
    }

    pub fn positions_value(&self) -> f64 {
        self.positions.values().map(|p| p.value).sum()
    }

    pub fn portfolio_value(&self) -> f64 {
        self.cash + self.positions_value()
    }

    //records the latest prices and revalues the book; non-finite or
    //non-positive prices are ignored and the previous mark is kept
    pub fn mark<'a, I>(&mut self, prices: I)
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        for (symbol, price) in prices {
            if price.is_finite() && price > 0.0 {
                self.prices.insert(symbol.to_string(), price);
            }
        }
        self.revalue();
    }

    //moves the holding in `symbol` by `delta` shares at the last marked price;
    //either commits fully or leaves every field untouched
    pub fn order(&mut self, symbol: &str, delta: i64) -> Result<i64, PortfolioError> {
        let held = self.amount(symbol);
        if delta == 0 {
            return Ok(held);
        }

        let after = held
            .checked_add(delta)
            .ok_or_else(|| PortfolioError::QuantityOverflow {
                symbol: symbol.to_string(),
            })?;
        if after < 0 {
            return Err(PortfolioError::NegativePosition {
                symbol: symbol.to_string(),
                held,
                delta,
            });
        }

        let price = self.price(symbol).ok_or_else(|| PortfolioError::NoPrice {
            symbol: symbol.to_string(),
        })?;

        //validated above, safe to create the entry now
        let position = self.positions.entry(symbol.to_string()).or_default();
        position.apply(delta, price);
        let amount = position.amount;

        self.cash -= delta as f64 * price;
        self.revalue();

        Ok(amount)
    }

    fn revalue(&mut self) {
        for (symbol, position) in self.positions.iter_mut() {
            if let Some(&price) = self.prices.get(symbol) {
                position.mark(price);
            }
        }

        let positions_value = self.positions_value();
        let portfolio_value = self.cash + positions_value;
        for position in self.positions.values_mut() {
            position.set_ratios(positions_value, portfolio_value);
        }
    }
}
