use crate::config::{BacktestConfiguration, SignalParams, StrategyParams, UniverseConfig};
use crate::data::panel::CLOSE_PRICE;
use crate::data::Panel;
use crate::engine::{ChannelConfig, Context, DailySlice, EngineError};
use crate::signal::{
    sentiment_threshold, trend_confirmation, volume_breakout, BUY_BREAKOUT, BUY_ETF, BUY_TREND,
    SELL_BREAKOUT, SELL_ETF, SELL_TREND,
};
use crate::strategy::Strategy;
use chrono::NaiveDate;
use indexmap::IndexSet;
use log::{debug, warn};

const BUY_CHANNELS: [&str; 2] = [BUY_TREND, BUY_BREAKOUT];
const SELL_CHANNELS: [&str; 2] = [SELL_TREND, SELL_BREAKOUT];

//symbols already acted on today
type DoneSet = IndexSet<String>;

//daily equity/etf strategy:
//1. close out positions outside their loss-cut / profit-take band
//2. buy one unit on every true buy cell (stocks only)
//3. sell one unit on every true sell cell not already handled today
//4. rebalance the etf toward its target weight, then trim one unit
pub struct DailySignalStrategy {
    universe: UniverseConfig,
    params: StrategyParams,
    signal_params: SignalParams,
}

impl DailySignalStrategy {
    pub fn new(
        universe: UniverseConfig,
        params: StrategyParams,
        signal_params: SignalParams,
    ) -> Self {
        DailySignalStrategy {
            universe,
            params,
            signal_params,
        }
    }

    pub fn from_config(config: &BacktestConfiguration) -> Self {
        Self::new(
            config.universe.clone(),
            config.strategy.clone(),
            config.signals.clone(),
        )
    }

    //(loss_cut, profit_take) for a symbol
    fn risk_band(&self, symbol: &str) -> (f64, f64) {
        if self.universe.is_etf(symbol) {
            (self.params.etf_loss_cut, self.params.etf_profit_take)
        } else {
            (self.params.stock_loss_cut, self.params.stock_profit_take)
        }
    }

    fn manage_risk(&self, ctx: &mut dyn Context, done: &mut DoneSet) -> Result<(), EngineError> {
        let held: Vec<(String, i64, f64)> = ctx
            .portfolio()
            .positions()
            .iter()
            .filter(|(_, pos)| !pos.is_flat())
            .map(|(symbol, pos)| (symbol.clone(), pos.amount, pos.returns))
            .collect();

        for (symbol, amount, returns) in held {
            let (loss_cut, profit_take) = self.risk_band(&symbol);

            let comment = if returns < loss_cut {
                format!("loss cut: {:.6}", returns)
            } else if returns > profit_take {
                format!("profit take: {:.6}", returns)
            } else {
                continue;
            };

            ctx.order(&symbol, -amount, &comment)?;
            debug!("CLOSE: {} {} ({})", symbol, amount, comment);
            done.insert(symbol);
        }
        Ok(())
    }

    //stocks with a true cell on `channel`, in universe order
    fn triggered(&self, current: &DailySlice, channel: &str) -> Vec<String> {
        let Some(row) = current.signal(channel) else {
            return Vec::new();
        };

        row.dropna()
            .present()
            .filter(|(symbol, fired)| *fired && !self.universe.is_etf(symbol))
            .map(|(symbol, _)| symbol.to_string())
            .collect()
    }

    //not gated on `done`: a same-day close-out may be followed by a re-buy
    fn signal_buys(
        &self,
        ctx: &mut dyn Context,
        current: &DailySlice,
        done: &mut DoneSet,
    ) -> Result<(), EngineError> {
        for channel in BUY_CHANNELS {
            for symbol in self.triggered(current, channel) {
                ctx.order(&symbol, self.params.unit_stock, channel)?;
                debug!(
                    "BUY: {}, {} @ {:?}",
                    channel,
                    code_of(&*ctx, &symbol),
                    current.field(CLOSE_PRICE, &symbol)
                );
                done.insert(symbol);
            }
        }
        Ok(())
    }

    fn signal_sells(
        &self,
        ctx: &mut dyn Context,
        current: &DailySlice,
        done: &mut DoneSet,
    ) -> Result<(), EngineError> {
        for channel in SELL_CHANNELS {
            for symbol in self.triggered(current, channel) {
                if done.contains(&symbol) {
                    continue;
                }

                let held = ctx.portfolio().amount(&symbol);
                if held == 0 {
                    debug!("SELL skipped: {}, {} is flat", channel, symbol);
                    continue;
                }

                ctx.order(&symbol, -self.params.unit_stock.min(held), channel)?;
                debug!(
                    "SELL: {}, {} @ {:?}",
                    channel,
                    code_of(&*ctx, &symbol),
                    current.field(CLOSE_PRICE, &symbol)
                );
                done.insert(symbol);
            }
        }
        Ok(())
    }

    //the etf channels are read for presence only; the rebalance runs every day
    fn rebalance_etf(
        &self,
        ctx: &mut dyn Context,
        current: &DailySlice,
        done: &mut DoneSet,
    ) -> Result<(), EngineError> {
        let etf = self.universe.etf_symbol();
        if ctx.security(&etf).is_none() {
            return Ok(());
        }

        let presence = |channel: &str| {
            current
                .signal(channel)
                .map_or(false, |row| row.is_present(&etf))
        };
        debug!(
            "ETF {} signals present: buy={} sell={}",
            etf,
            presence(BUY_ETF),
            presence(SELL_ETF)
        );

        if ctx.quote(&etf).is_none() {
            warn!("{}: no price for {}, etf rebalance skipped", current.date, etf);
            return Ok(());
        }

        //a single etf: the whole etf allocation goes to it
        ctx.order_target_percent(&etf, self.params.etf_ratio, "etf signal buy")?;
        done.insert(etf.clone());
        debug!("BUY: {}", etf);

        let held = ctx.portfolio().amount(&etf);
        if held == 0 {
            debug!("SELL skipped: {} is flat", etf);
            return Ok(());
        }

        ctx.order(&etf, -self.params.unit_etf.min(held), "etf signal sell")?;
        done.insert(etf.clone());
        debug!("SELL: {}", etf);
        Ok(())
    }
}

//listing code for log lines, the symbol itself when unconfigured
fn code_of(ctx: &dyn Context, symbol: &str) -> String {
    ctx.security(symbol)
        .map_or_else(|| symbol.to_string(), |sec| sec.code().to_string())
}

impl Strategy for DailySignalStrategy {
    fn initialize(&mut self, ctx: &mut dyn Context) -> Result<(), EngineError> {
        debug!("initialize() called");

        ctx.configure(ChannelConfig {
            market: self.universe.market.clone(),
            symbols: self.universe.symbols(),
            fields: self.universe.fields.clone(),
        })?;

        let params = self.signal_params.clone();
        ctx.register_signal(
            "trend",
            Box::new(move |panel: &Panel| trend_confirmation(panel, &params)),
        )?;

        let params = self.signal_params.clone();
        ctx.register_signal(
            "breakout",
            Box::new(move |panel: &Panel| volume_breakout(panel, &params)),
        )?;

        let params = self.signal_params.clone();
        ctx.register_signal(
            "etf_sentiment",
            Box::new(move |panel: &Panel| sentiment_threshold(panel, &params)),
        )?;

        Ok(())
    }

    fn handle_signals(
        &mut self,
        ctx: &mut dyn Context,
        date: NaiveDate,
        current: &DailySlice,
    ) -> Result<(), EngineError> {
        debug!("handle_signals called for {}", date);

        let mut done = DoneSet::new();
        self.manage_risk(ctx, &mut done)?;
        self.signal_buys(ctx, current, &mut done)?;
        self.signal_sells(ctx, current, &mut done)?;
        self.rebalance_etf(ctx, current, &mut done)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "daily_signals"
    }
}
