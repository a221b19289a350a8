mod common;

use common::*;
use daybreak::data::panel::{CLOSE_PRICE, VOLUME};
use daybreak::prelude::*;
use std::io::Write;

#[test]
fn full_run_never_goes_short() {
    let panel = synthetic_panel(150);
    let engine = BacktestEngine::new(small_config(), panel);
    let mut strat = strategy();

    let result = engine.run(&mut strat).unwrap();

    assert_eq!(result.strategy, "daily_signals");
    assert_eq!(result.snapshots.len(), 150);
    assert!(result.orders.iter().all(|o| o.amount_after >= 0));
    assert!(result
        .portfolio
        .positions()
        .values()
        .all(|p| p.amount >= 0));

    //snapshot order counts add up to the log
    let logged: usize = result.snapshots.iter().map(|s| s.orders).sum();
    assert_eq!(logged, result.orders.len());

    //the etf is priced from day one, so every day carries its rebalance
    let rebalances = result
        .orders
        .iter()
        .filter(|o| o.symbol == ETF && o.kind == "target_percent")
        .count();
    assert_eq!(rebalances, 150);

    for snapshot in &result.snapshots {
        let sum = snapshot.cash + snapshot.positions_value;
        assert!((snapshot.portfolio_value - sum).abs() < 1e-6);
    }
}

#[test]
fn full_panel_signals_match_prefix_evaluation() {
    let panel = synthetic_panel(90);
    let params = SignalParams::default();

    type SignalRun = fn(&Panel, &SignalParams) -> Result<SignalSet, SignalError>;
    let runs: [SignalRun; 3] = [trend_confirmation, volume_breakout, sentiment_threshold];

    for run in runs {
        let full = run(&panel, &params).unwrap();
        for t in [0, 4, 5, 19, 20, 24, 25, 26, 44, 45, 70, 89] {
            let prefix = run(&panel.head(t + 1), &params).unwrap();
            for (name, matrix) in &full {
                let expected: Vec<_> = matrix.row(t).collect();
                let actual: Vec<_> = prefix[name].row(t).collect();
                assert_eq!(expected, actual, "{} at row {}", name, t);
            }
        }
    }
}

#[test]
fn missing_declared_field_aborts_before_trading() {
    let mut builder = PanelBuilder::new().field(CLOSE_PRICE).field(VOLUME);
    for i in 0..5 {
        builder.record(date(i), S1, CLOSE_PRICE, Some(1000.0));
        builder.record(date(i), S1, VOLUME, Some(1000.0));
    }
    let panel = builder.build().unwrap();

    let engine = BacktestEngine::new(small_config(), panel);
    let err = engine.run(&mut strategy()).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Panel(PanelError::MissingField(_))
    ));
}

#[test]
fn runs_from_csv_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "date,symbol,close_price_adj,volume_adj,ns_fear,ns_optimism"
    )
    .unwrap();
    for i in 0..40 {
        let d = date(i);
        writeln!(file, "{},{},{},1000,0.1,0.95", d, S1, 1000 + i).unwrap();
        //gap in the etf close on one day
        if i == 10 {
            writeln!(file, "{},{},,1000,0.1,0.95", d, ETF).unwrap();
        } else {
            writeln!(file, "{},{},500,1000,0.1,0.95", d, ETF).unwrap();
        }
    }
    file.flush().unwrap();

    let panel = load_panel_csv(file.path()).unwrap();
    assert_eq!(panel.num_dates(), 40);
    assert_eq!(panel.field(CLOSE_PRICE).unwrap().get(10, ETF), Some(&None));

    let engine = BacktestEngine::new(small_config(), panel);
    let result = engine.run(&mut strategy()).unwrap();

    //forward-filled price keeps the etf tradable through the gap
    let day_ten: Vec<_> = result
        .orders
        .iter()
        .filter(|o| o.date == date(10) && o.symbol == ETF)
        .collect();
    assert_eq!(day_ten.len(), 2);
    assert_eq!(day_ten[0].price, Some(500.0));
}
