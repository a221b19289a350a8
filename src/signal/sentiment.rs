use crate::config::SignalParams;
use crate::data::panel::{FEAR, OPTIMISM};
use crate::data::Panel;
use crate::signal::{SignalError, SignalSet, BUY_ETF, SELL_ETF};

//news sentiment thresholds, scores assumed normalized to [0, 1]
pub fn sentiment_threshold(panel: &Panel, params: &SignalParams) -> Result<SignalSet, SignalError> {
    let optimism = panel.field(OPTIMISM)?.forward_fill();
    let fear = panel.field(FEAR)?.forward_fill();
    let threshold = params.sentiment_threshold;

    let mut signals = SignalSet::new();
    signals.insert(
        BUY_ETF.to_string(),
        optimism.map(|score| score.map(|s| s >= threshold)),
    );
    signals.insert(
        SELL_ETF.to_string(),
        fear.map(|score| score.map(|s| s >= threshold)),
    );
    Ok(signals)
}
