#![allow(dead_code)]

use chrono::NaiveDate;
use daybreak::data::panel::{CLOSE_PRICE, FEAR, OPTIMISM, VOLUME};
use daybreak::prelude::*;
use indexmap::IndexMap;

pub const S1: &str = "jp.stock.1605";
pub const S2: &str = "jp.stock.1925";
pub const ETF: &str = "jp.stock.1357";

pub fn date(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 4, 1).unwrap() + chrono::Duration::days(i as i64)
}

//two stocks plus the etf
pub fn small_universe() -> UniverseConfig {
    UniverseConfig {
        stock_codes: vec!["1605".to_string(), "1925".to_string()],
        ..UniverseConfig::default()
    }
}

pub fn small_config() -> BacktestConfiguration {
    BacktestConfiguration {
        universe: small_universe(),
        ..BacktestConfiguration::default()
    }
}

pub fn strategy() -> DailySignalStrategy {
    DailySignalStrategy::from_config(&small_config())
}

//a context that has been through strategy initialization
pub fn initialized(strategy: &mut DailySignalStrategy) -> BacktestContext {
    let config = small_config();
    let mut ctx = BacktestContext::new(config.initial_cash, config.universe.lot_size);
    strategy.initialize(&mut ctx).unwrap();
    ctx
}

//hand-built daily slice: (channel, [(symbol, cell)])
pub fn slice(day: usize, channels: &[(&str, &[(&str, Option<bool>)])]) -> DailySlice {
    let signals = channels
        .iter()
        .map(|(name, cells)| {
            let row: IndexMap<String, Option<bool>> = cells
                .iter()
                .map(|(symbol, cell)| (symbol.to_string(), *cell))
                .collect();
            (name.to_string(), SignalRow::new(row))
        })
        .collect();
    DailySlice::new(date(day), day, IndexMap::new(), signals)
}

pub fn orders_on<'a>(ctx: &'a BacktestContext, day: usize, symbol: &str) -> Vec<&'a OrderRecord> {
    ctx.orders()
        .iter()
        .filter(|o| o.date == date(day) && o.symbol == symbol)
        .collect()
}

//deterministic panel over the small universe with a few gaps
pub fn synthetic_panel(days: usize) -> Panel {
    let mut builder = PanelBuilder::new()
        .field(CLOSE_PRICE)
        .field(VOLUME)
        .field(FEAR)
        .field(OPTIMISM);

    for (k, symbol) in [S1, S2, ETF].iter().enumerate() {
        for i in 0..days {
            let t = i as f64;
            let base = 1000.0 + 300.0 * k as f64;
            let close = base * (1.0 + 0.12 * (t / (9.0 + k as f64)).sin() + 0.001 * t);
            let volume = if (i + 3 * k) % 17 == 0 {
                9000.0
            } else {
                1000.0 + 10.0 * (i % 5) as f64
            };
            let optimism = ((i * 37 + k * 11) % 100) as f64 / 100.0;
            let fear = ((i * 53 + k * 7) % 100) as f64 / 100.0;

            //sprinkle missing observations, never on the first day
            let gap = i > 0 && (i + k) % 23 == 0;

            builder.record(date(i), symbol, CLOSE_PRICE, (!gap).then_some(close));
            builder.record(date(i), symbol, VOLUME, (!gap).then_some(volume));
            builder.record(date(i), symbol, FEAR, Some(fear));
            builder.record(date(i), symbol, OPTIMISM, Some(optimism));
        }
    }

    builder.build().unwrap()
}
