pub mod breakout;
pub mod sentiment;
pub mod trend;

use crate::config::SignalParams;
use crate::data::panel::CLOSE_PRICE;
use crate::data::{FieldFrame, Frame, Panel, PanelError};
use crate::indicator::{rolling_average_frame, rolling_sum_frame, IndicatorError};
use indexmap::IndexMap;
use thiserror::Error;

pub use breakout::volume_breakout;
pub use sentiment::sentiment_threshold;
pub use trend::trend_confirmation;

pub const BUY_TREND: &str = "buy:trend";
pub const SELL_TREND: &str = "sell:trend";
pub const BUY_BREAKOUT: &str = "buy:breakout";
pub const SELL_BREAKOUT: &str = "sell:breakout";
pub const BUY_ETF: &str = "buy:etf";
pub const SELL_ETF: &str = "sell:etf";

//per (date, symbol): some(bool) when the inputs were defined, none for no opinion
pub type SignalMatrix = Frame<Option<bool>>;

//channel name -> matrix, in the order the signal emitted them
pub type SignalSet = IndexMap<String, SignalMatrix>;

//a registered signal: a pure function of the panel
pub type SignalFn = Box<dyn Fn(&Panel) -> Result<SignalSet, SignalError> + Send + Sync>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    #[error(transparent)]
    Panel(#[from] PanelError),
    #[error(transparent)]
    Indicator(#[from] IndicatorError),
}

//forward-filled close with its short and long trailing averages
struct MovingAverages {
    close: FieldFrame,
    short: FieldFrame,
    long: FieldFrame,
}

fn moving_averages(panel: &Panel, params: &SignalParams) -> Result<MovingAverages, SignalError> {
    let close = panel.field(CLOSE_PRICE)?.forward_fill();
    let short = rolling_average_frame(&close, params.short_window)?;
    let long = rolling_average_frame(&close, params.long_window)?;
    Ok(MovingAverages { close, short, long })
}

//true where `holds(short, long)` was met on more than `count_threshold` of the
//last `count_window` days; an undefined comparison counts as not met
fn persistent_trend<F>(
    averages: &MovingAverages,
    params: &SignalParams,
    holds: F,
) -> Result<Frame<bool>, SignalError>
where
    F: Fn(f64, f64) -> bool + Sync + Send,
{
    let flags = averages.short.zip_with(&averages.long, |short, long| match (short, long) {
        (Some(s), Some(l)) if holds(*s, *l) => Some(1.0),
        _ => Some(0.0),
    })?;

    let count = rolling_sum_frame(&flags, params.count_window)?;
    let threshold = f64::from(params.count_threshold);
    Ok(count.map(|c| c.map_or(false, |c| c > threshold)))
}

//|average - price| / average below tolerance; absent when either side is
//missing or the average is too close to zero to divide by
fn near_average(
    average: &FieldFrame,
    price: &FieldFrame,
    tolerance: f64,
) -> Result<SignalMatrix, SignalError> {
    Ok(average.zip_with(price, |average, price| match (average, price) {
        (Some(a), Some(p)) if a.abs() > f64::EPSILON => Some(((a - p) / a).abs() < tolerance),
        _ => None,
    })?)
}

//a and b where b is defined
fn confirm(
    condition: &SignalMatrix,
    persistent: &Frame<bool>,
) -> Result<SignalMatrix, SignalError> {
    Ok(condition.zip_with(persistent, |cell, persistent| {
        cell.map(|met| met && *persistent)
    })?)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::data::{Panel, PanelBuilder};
    use chrono::NaiveDate;

    pub fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2018, 1, 4).unwrap();
        (0..n)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect()
    }

    //one symbol, one field per (name, series) pair
    pub fn single_symbol_panel(symbol: &str, series: &[(&str, Vec<Option<f64>>)]) -> Panel {
        let n = series.first().map_or(0, |(_, s)| s.len());
        let mut builder = PanelBuilder::new().symbol(symbol);
        for (field, values) in series {
            builder = builder.field(field);
            for (date, value) in dates(n).into_iter().zip(values) {
                builder.record(date, symbol, field, *value);
            }
        }
        builder.build().unwrap()
    }
}
