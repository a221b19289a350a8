use crate::config::SignalParams;
use crate::data::Panel;
use crate::signal::{
    confirm, moving_averages, near_average, persistent_trend, SignalError, SignalSet, BUY_TREND,
    SELL_TREND,
};

//trend confirmation
//buy: short ma above long ma on most of the last count_window days,
//and the close sits within `proximity` of the short ma
//sell: "buy above ten" on a 0/1 matrix, so it never fires; exits are left to
//the loss-cut / profit-take rules
pub fn trend_confirmation(panel: &Panel, params: &SignalParams) -> Result<SignalSet, SignalError> {
    let averages = moving_averages(panel, params)?;
    let uptrend = persistent_trend(&averages, params, |short, long| short > long)?;
    let near_short = near_average(&averages.short, &averages.close, params.proximity)?;

    let buy = confirm(&near_short, &uptrend)?;
    let sell = buy.map(|cell| cell.map(|fired| u8::from(fired) > 10));

    let mut signals = SignalSet::new();
    signals.insert(BUY_TREND.to_string(), buy);
    signals.insert(SELL_TREND.to_string(), sell);
    Ok(signals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::panel::CLOSE_PRICE;
    use crate::signal::fixtures::single_symbol_panel;

    const SYM: &str = "jp.stock.3405";

    fn run(close: Vec<Option<f64>>) -> SignalSet {
        let panel = single_symbol_panel(SYM, &[(CLOSE_PRICE, close)]);
        trend_confirmation(&panel, &SignalParams::default()).unwrap()
    }

    #[test]
    fn flat_price_never_buys() {
        let signals = run(vec![Some(1000.0); 80]);
        let buy = signals[BUY_TREND].column(SYM).unwrap();
        assert!(buy.iter().all(|cell| *cell == Some(false)));
    }

    #[test]
    fn steady_rise_confirms_uptrend() {
        let close: Vec<Option<f64>> = (0..60).map(|i| Some(1000.0 + 2.0 * i as f64)).collect();
        let signals = run(close);
        let buy = signals[BUY_TREND].column(SYM).unwrap();

        //short ma of the 5 prior closes trails the close by 6: 6/1112 < 1%
        assert_eq!(buy[59], Some(true));
        //before count_window rows the count is the raw 0/1 flag, never above 14
        assert!(buy[..20].iter().all(|cell| *cell == Some(false)));
    }

    #[test]
    fn sell_channel_is_always_false() {
        let close: Vec<Option<f64>> = (0..60).map(|i| Some(1000.0 + 2.0 * i as f64)).collect();
        let signals = run(close);
        let sell = signals[SELL_TREND].column(SYM).unwrap();
        assert!(sell.iter().all(|cell| *cell != Some(true)));
    }

    #[test]
    fn leading_gap_is_absent_not_false() {
        let mut close = vec![None, None];
        close.extend(std::iter::repeat(Some(500.0)).take(30));
        let signals = run(close);
        let buy = signals[BUY_TREND].column(SYM).unwrap();
        assert_eq!(buy[0], None);
        assert_eq!(buy[1], None);
        //the first window after the gap still contains it
        assert_eq!(buy[5], None);
        assert_eq!(buy[7], Some(false));
    }

    #[test]
    fn zero_average_is_absent() {
        let signals = run(vec![Some(0.0); 30]);
        let buy = signals[BUY_TREND].column(SYM).unwrap();
        assert!(buy.iter().all(Option::is_none));
    }

    #[test]
    fn missing_close_field_is_an_error() {
        let panel = single_symbol_panel(SYM, &[("volume_adj", vec![Some(1.0)])]);
        assert!(trend_confirmation(&panel, &SignalParams::default()).is_err());
    }
}
