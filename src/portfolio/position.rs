use serde::{Deserialize, Serialize};

//holding in one symbol; created on the first order, never removed, only zeroed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    //share count, never negative
    pub amount: i64,

    //lifetime purchase and sale totals
    pub total_buy_price: f64,
    pub total_sell_price: f64,

    //purchase and sale totals for the current holding, reset when flat
    pub buy_price: f64,
    pub sell_price: f64,

    //weighted average cost per share of the current holding
    pub avg_cost: f64,

    //mark-to-market value
    pub value: f64,

    //share of all position value / share of total portfolio value
    pub position_ratio: f64,
    pub portfolio_ratio: f64,

    //unrealized pnl against cost basis, and pnl / cost basis
    pub pnl: f64,
    pub returns: f64,
}

impl Position {
    pub fn is_flat(&self) -> bool {
        self.amount == 0
    }

    //avg_cost * amount
    pub fn cost_basis(&self) -> f64 {
        self.avg_cost * self.amount as f64
    }

    //applies a signed fill; the caller has already checked amount + delta >= 0
    pub(crate) fn apply(&mut self, delta: i64, price: f64) {
        let notional = delta.unsigned_abs() as f64 * price;

        if delta > 0 {
            let total_qty = self.amount + delta;
            self.avg_cost = (self.cost_basis() + notional) / total_qty as f64;
            self.total_buy_price += notional;
            self.buy_price += notional;
        } else if delta < 0 {
            self.total_sell_price += notional;
            self.sell_price += notional;
        }

        self.amount += delta;

        //flat again: the running accumulators start over
        if self.amount == 0 {
            self.buy_price = 0.0;
            self.sell_price = 0.0;
            self.avg_cost = 0.0;
        }

        self.mark(price);
    }

    //revalues at the given price
    pub(crate) fn mark(&mut self, price: f64) {
        self.value = self.amount as f64 * price;

        let basis = self.cost_basis();
        self.pnl = self.value - basis;
        self.returns = if basis > 0.0 { self.pnl / basis } else { 0.0 };
    }

    pub(crate) fn set_ratios(&mut self, positions_value: f64, portfolio_value: f64) {
        self.position_ratio = ratio(self.value, positions_value);
        self.portfolio_ratio = ratio(self.value, portfolio_value);
    }
}

fn ratio(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole
    } else {
        0.0
    }
}
