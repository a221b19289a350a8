use crate::engine::execution::{OrderRecord, OrderSide};
use crate::metrics::timeseries::{max_drawdown, DailySnapshot};
use crate::portfolio::PortfolioState;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};

//headline numbers for a finished run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub strategy: String,
    pub first_date: Option<chrono::NaiveDate>,
    pub last_date: Option<chrono::NaiveDate>,
    pub num_days: usize,
    pub initial_cash: f64,
    pub final_cash: f64,
    pub final_value: f64,
    pub total_return: f64,
    pub total_return_pct: f64,
    pub max_drawdown: f64,
    pub num_orders: usize,
    pub num_buys: usize,
    pub num_sells: usize,
    pub open_positions: usize,
}

impl RunSummary {
    pub fn from_run(
        strategy: &str,
        snapshots: &[DailySnapshot],
        orders: &[OrderRecord],
        portfolio: &PortfolioState,
    ) -> Self {
        let initial_cash = portfolio.starting_cash();
        let final_value = portfolio.portfolio_value();
        let total_return = final_value - initial_cash;

        let count_side =
            |side: OrderSide| orders.iter().filter(|o| o.side == Some(side)).count();

        RunSummary {
            strategy: strategy.to_string(),
            first_date: snapshots.first().map(|s| s.date),
            last_date: snapshots.last().map(|s| s.date),
            num_days: snapshots.len(),
            initial_cash,
            final_cash: portfolio.cash(),
            final_value,
            total_return,
            total_return_pct: if initial_cash > 0.0 {
                total_return / initial_cash
            } else {
                0.0
            },
            max_drawdown: max_drawdown(snapshots),
            num_orders: orders.len(),
            num_buys: count_side(OrderSide::Buy),
            num_sells: count_side(OrderSide::Sell),
            open_positions: portfolio
                .positions()
                .values()
                .filter(|p| !p.is_flat())
                .count(),
        }
    }

    //prints metrics in a formatted table
    pub fn pretty_print_table(&self) {
        let mut table = Table::new();

        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        table.add_row(Row::new(vec![
            Cell::new("Strategy"),
            Cell::new(&self.strategy),
        ]));

        let period = match (self.first_date, self.last_date) {
            (Some(first), Some(last)) => format!("{} .. {} ({} days)", first, last, self.num_days),
            _ => "no trading days".to_string(),
        };
        table.add_row(Row::new(vec![Cell::new("Period"), Cell::new(&period)]));

        table.add_row(Row::new(vec![
            Cell::new("Initial Cash"),
            Cell::new(&format!("{:.0}", self.initial_cash)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Final Cash"),
            Cell::new(&format!("{:.0}", self.final_cash)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Final Value"),
            Cell::new(&format!("{:.0}", self.final_value)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Total Return"),
            Cell::new(&format!(
                "{:.0} ({:.2}%)",
                self.total_return,
                self.total_return_pct * 100.0
            )),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Max Drawdown"),
            Cell::new(&format!("{:.2}%", self.max_drawdown * 100.0)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Orders (buy / sell)"),
            Cell::new(&format!(
                "{} ({} / {})",
                self.num_orders, self.num_buys, self.num_sells
            )),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Open Positions"),
            Cell::new(&self.open_positions.to_string()),
        ]));

        table.printstd();
    }
}

//one row per position ever opened
pub fn print_positions_table(portfolio: &PortfolioState) {
    let mut table = Table::new();

    table.add_row(Row::new(
        ["Symbol", "Amount", "Avg Cost", "Value", "PnL", "Returns", "Weight"]
            .iter()
            .map(|h| Cell::new(h))
            .collect(),
    ));

    for (symbol, pos) in portfolio.positions() {
        table.add_row(Row::new(vec![
            Cell::new(symbol),
            Cell::new(&pos.amount.to_string()),
            Cell::new(&format!("{:.2}", pos.avg_cost)),
            Cell::new(&format!("{:.0}", pos.value)),
            Cell::new(&format!("{:.0}", pos.pnl)),
            Cell::new(&format!("{:.2}%", pos.returns * 100.0)),
            Cell::new(&format!("{:.2}%", pos.portfolio_ratio * 100.0)),
        ]));
    }

    table.printstd();
}
