use crate::config::SignalParams;
use crate::data::panel::VOLUME;
use crate::data::Panel;
use crate::indicator::rolling_average_frame;
use crate::signal::{
    confirm, moving_averages, near_average, persistent_trend, SignalError, SignalSet,
    BUY_BREAKOUT, SELL_BREAKOUT,
};

//volume breakout against a persistent downtrend
//buy: short ma below long ma on most of the last count_window days, and today's
//volume exceeds volume_multiple x its trailing average
//sell: close within `proximity` of the long ma
pub fn volume_breakout(panel: &Panel, params: &SignalParams) -> Result<SignalSet, SignalError> {
    let averages = moving_averages(panel, params)?;
    let volume = panel.field(VOLUME)?.forward_fill();

    let downtrend = persistent_trend(&averages, params, |short, long| short < long)?;

    let volume_average = rolling_average_frame(&volume, params.volume_window)?;
    let multiple = params.volume_multiple;
    let surge = volume.zip_with(&volume_average, |today, average| match (today, average) {
        (Some(v), Some(a)) => Some(*v > multiple * a),
        _ => None,
    })?;

    let buy = confirm(&surge, &downtrend)?;
    let sell = near_average(&averages.long, &averages.close, params.proximity)?;

    let mut signals = SignalSet::new();
    signals.insert(BUY_BREAKOUT.to_string(), buy);
    signals.insert(SELL_BREAKOUT.to_string(), sell);
    Ok(signals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::panel::CLOSE_PRICE;
    use crate::signal::fixtures::single_symbol_panel;

    const SYM: &str = "jp.stock.6501";

    fn falling_close(n: usize) -> Vec<Option<f64>> {
        (0..n).map(|i| Some(2000.0 - 5.0 * i as f64)).collect()
    }

    #[test]
    fn volume_spike_in_downtrend_buys() {
        let mut volume = vec![Some(1000.0); 60];
        volume[50] = Some(2500.0);
        let panel = single_symbol_panel(
            SYM,
            &[(CLOSE_PRICE, falling_close(60)), (VOLUME, volume)],
        );

        let signals = volume_breakout(&panel, &SignalParams::default()).unwrap();
        let buy = signals[BUY_BREAKOUT].column(SYM).unwrap();
        assert_eq!(buy[50], Some(true));
        //the spike inflates the next trailing averages but never doubles them
        assert_eq!(buy[51], Some(false));
        assert_eq!(buy[49], Some(false));
    }

    #[test]
    fn volume_spike_without_downtrend_does_not_buy() {
        let mut volume = vec![Some(1000.0); 60];
        volume[50] = Some(5000.0);
        let panel = single_symbol_panel(
            SYM,
            &[(CLOSE_PRICE, vec![Some(1500.0); 60]), (VOLUME, volume)],
        );

        let signals = volume_breakout(&panel, &SignalParams::default()).unwrap();
        assert_eq!(signals[BUY_BREAKOUT].column(SYM).unwrap()[50], Some(false));
    }

    #[test]
    fn sell_fires_near_long_average() {
        let panel = single_symbol_panel(
            SYM,
            &[
                (CLOSE_PRICE, vec![Some(1500.0); 40]),
                (VOLUME, vec![Some(1000.0); 40]),
            ],
        );

        let signals = volume_breakout(&panel, &SignalParams::default()).unwrap();
        let sell = signals[SELL_BREAKOUT].column(SYM).unwrap();
        assert!(sell.iter().all(|cell| *cell == Some(true)));
    }

    #[test]
    fn sell_is_quiet_far_from_long_average() {
        let panel = single_symbol_panel(
            SYM,
            &[(CLOSE_PRICE, falling_close(60)), (VOLUME, vec![Some(1.0); 60])],
        );

        let signals = volume_breakout(&panel, &SignalParams::default()).unwrap();
        //long ma of the 25 prior closes sits 65 above the close: 65/1865 > 1%
        assert_eq!(signals[SELL_BREAKOUT].column(SYM).unwrap()[40], Some(false));
    }

    #[test]
    fn missing_volume_leaves_buy_absent() {
        let panel = single_symbol_panel(
            SYM,
            &[(CLOSE_PRICE, falling_close(30)), (VOLUME, vec![None; 30])],
        );

        let signals = volume_breakout(&panel, &SignalParams::default()).unwrap();
        assert!(signals[BUY_BREAKOUT]
            .column(SYM)
            .unwrap()
            .iter()
            .all(Option::is_none));
    }
}
