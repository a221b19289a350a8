use crate::config::BacktestConfiguration;
use crate::data::Panel;
use crate::engine::context::{ChannelConfig, Context, EngineError};
use crate::engine::current::DailySlice;
use crate::engine::execution::{ExecutionEngine, OrderRecord, OrderRequest};
use crate::instrument::Security;
use crate::metrics::{DailySnapshot, SnapshotRecorder};
use crate::portfolio::PortfolioState;
use crate::signal::{SignalFn, SignalMatrix};
use crate::strategy::Strategy;
use chrono::NaiveDate;
use indexmap::{IndexMap, IndexSet};
use log::{debug, info};

//result of a backtest
#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub strategy: String,
    pub snapshots: Vec<DailySnapshot>,
    pub orders: Vec<OrderRecord>,
    pub portfolio: PortfolioState,
}

//the host side of `Context`: owns the book, the registries and the order log
pub struct BacktestContext {
    lot_size: i64,
    portfolio: PortfolioState,
    execution: ExecutionEngine,
    channels: IndexMap<String, ChannelConfig>,
    securities: IndexMap<String, Security>,
    fields: IndexSet<String>,
    signals: IndexMap<String, SignalFn>,
    //set between begin_day and end_day
    today: Option<NaiveDate>,
}

impl BacktestContext {
    pub fn new(initial_cash: f64, lot_size: i64) -> Self {
        BacktestContext {
            lot_size,
            portfolio: PortfolioState::new(initial_cash),
            execution: ExecutionEngine::new(),
            channels: IndexMap::new(),
            securities: IndexMap::new(),
            fields: IndexSet::new(),
            signals: IndexMap::new(),
            today: None,
        }
    }

    //opens a trading day: marks the book and allows orders
    pub fn begin_day<'a, I>(&mut self, date: NaiveDate, prices: I)
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        self.portfolio.mark(prices);
        self.today = Some(date);
    }

    pub fn end_day(&mut self) {
        self.today = None;
    }

    //configured symbols, in configuration order
    pub fn universe(&self) -> IndexSet<String> {
        self.securities.keys().cloned().collect()
    }

    //panel fields requested by every configured channel
    pub fn fields(&self) -> &IndexSet<String> {
        &self.fields
    }

    pub fn signal_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.signals.keys().map(String::as_str)
    }

    //runs every registered signal over the panel and merges their channels
    pub fn evaluate_signals(
        &self,
        panel: &Panel,
    ) -> Result<IndexMap<String, SignalMatrix>, EngineError> {
        let mut merged = IndexMap::new();

        for (name, signal) in &self.signals {
            let set = signal(panel).map_err(|source| EngineError::Signal {
                name: name.clone(),
                source,
            })?;

            for (channel, matrix) in set {
                if merged.contains_key(&channel) {
                    return Err(EngineError::DuplicateSignal(channel));
                }
                debug!("signal {} produced channel {}", name, channel);
                merged.insert(channel, matrix);
            }
        }

        Ok(merged)
    }

    pub fn orders(&self) -> &[OrderRecord] {
        self.execution.orders()
    }

    pub fn into_parts(self) -> (PortfolioState, Vec<OrderRecord>) {
        (self.portfolio, self.execution.into_orders())
    }
}

impl Context for BacktestContext {
    fn configure(&mut self, channel: ChannelConfig) -> Result<(), EngineError> {
        if self.channels.contains_key(&channel.market) {
            return Err(EngineError::DuplicateChannel(channel.market));
        }

        for symbol in &channel.symbols {
            self.securities
                .entry(symbol.clone())
                .or_insert_with(|| Security::new(symbol.clone(), self.lot_size));
        }
        self.fields.extend(channel.fields.iter().cloned());

        info!(
            "configured market {} with {} symbols",
            channel.market,
            channel.symbols.len()
        );
        self.channels.insert(channel.market.clone(), channel);
        Ok(())
    }

    fn register_signal(&mut self, name: &str, signal: SignalFn) -> Result<(), EngineError> {
        if self.signals.contains_key(name) {
            return Err(EngineError::DuplicateSignal(name.to_string()));
        }
        self.signals.insert(name.to_string(), signal);
        Ok(())
    }

    fn security(&self, symbol: &str) -> Option<&Security> {
        self.securities.get(symbol)
    }

    fn portfolio(&self) -> &PortfolioState {
        &self.portfolio
    }

    fn submit(
        &mut self,
        symbol: &str,
        request: OrderRequest,
        comment: &str,
    ) -> Result<i64, EngineError> {
        let date = self.today.ok_or(EngineError::NotRunning)?;
        let security = self
            .securities
            .get(symbol)
            .ok_or_else(|| EngineError::UnknownSecurity(symbol.to_string()))?;

        let amount = self
            .execution
            .execute(&mut self.portfolio, security, date, request, comment)?;
        Ok(amount)
    }
}

//main backtest engine
pub struct BacktestEngine {
    config: BacktestConfiguration,
    panel: Panel,
}

impl BacktestEngine {
    pub fn new(config: BacktestConfiguration, panel: Panel) -> Self {
        BacktestEngine { config, panel }
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    //runs the backtest with the given strategy
    pub fn run(&self, strategy: &mut dyn Strategy) -> Result<BacktestResult, EngineError> {
        let mut ctx = BacktestContext::new(self.config.initial_cash, self.config.universe.lot_size);

        strategy.initialize(&mut ctx)?;

        //every declared field must exist before any day is processed
        for field in ctx.fields() {
            self.panel.field(field)?;
        }

        let signals = ctx.evaluate_signals(&self.panel)?;
        let prices = self.panel.field(&self.config.price_field)?.forward_fill();
        let universe = ctx.universe();

        info!(
            "running {} over {} days, {} symbols, {} signal channels from [{}]",
            strategy.name(),
            self.panel.num_dates(),
            universe.len(),
            signals.len(),
            ctx.signal_names().collect::<Vec<_>>().join(", ")
        );

        let mut recorder = SnapshotRecorder::new(self.config.initial_cash);

        for row in 0..self.panel.num_dates() {
            let Some(current) =
                DailySlice::extract(&self.panel, &signals, row, ctx.fields(), &universe)
            else {
                continue;
            };
            let date = current.date;

            let marks = prices
                .row(row)
                .filter(|(symbol, _)| universe.contains(*symbol))
                .filter_map(|(symbol, price)| price.map(|p| (symbol, p)));
            ctx.begin_day(date, marks);

            let orders_before = ctx.orders().len();
            strategy.handle_signals(&mut ctx, date, &current)?;
            ctx.end_day();

            let portfolio = ctx.portfolio();
            recorder.record(
                date,
                portfolio.cash(),
                portfolio.positions_value(),
                ctx.orders().len() - orders_before,
            );
        }

        let (portfolio, orders) = ctx.into_parts();
        info!(
            "finished {}: {} orders, final value {:.0}",
            strategy.name(),
            orders.len(),
            portfolio.portfolio_value()
        );

        Ok(BacktestResult {
            strategy: strategy.name().to_string(),
            snapshots: recorder.into_snapshots(),
            orders,
            portfolio,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PanelError;
    use crate::portfolio::PortfolioError;
    use crate::signal::{SignalError, SignalSet};

    const SYM: &str = "jp.stock.1605";

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    fn empty_signal() -> SignalFn {
        Box::new(|_: &Panel| -> Result<SignalSet, SignalError> { Ok(SignalSet::new()) })
    }

    fn configured() -> BacktestContext {
        let mut ctx = BacktestContext::new(1_000_000.0, 100);
        ctx.configure(ChannelConfig {
            market: "jp.stock".to_string(),
            symbols: vec![SYM.to_string()],
            fields: vec!["close_price_adj".to_string()],
        })
        .unwrap();
        ctx
    }

    #[test]
    fn orders_need_an_open_day() {
        let mut ctx = configured();
        assert!(matches!(
            ctx.order(SYM, 100, "early"),
            Err(EngineError::NotRunning)
        ));

        ctx.begin_day(day(1), [(SYM, 1000.0)]);
        assert_eq!(ctx.order(SYM, 100, "ok").unwrap(), 100);
        ctx.end_day();
        assert!(matches!(
            ctx.order(SYM, 100, "late"),
            Err(EngineError::NotRunning)
        ));
    }

    #[test]
    fn oversized_orders_fail_without_touching_the_book() {
        let mut ctx = configured();
        ctx.begin_day(day(1), [(SYM, 1000.0)]);
        ctx.order(SYM, 100, "seed").unwrap();
        let cash = ctx.portfolio().cash();

        for result in [
            ctx.order_value(SYM, 1e30, "huge value"),
            ctx.order(SYM, i64::MAX, "huge units"),
            ctx.order_target(SYM, i64::MIN, "huge target"),
        ] {
            assert!(matches!(
                result,
                Err(EngineError::Portfolio(PortfolioError::QuantityOverflow { .. }))
            ));
        }

        assert_eq!(ctx.portfolio().amount(SYM), 100);
        assert_eq!(ctx.portfolio().cash(), cash);
        assert_eq!(ctx.orders().len(), 1);
    }

    #[test]
    fn unknown_symbols_are_rejected() {
        let mut ctx = configured();
        ctx.begin_day(day(1), [("jp.stock.9999", 1000.0)]);
        assert!(matches!(
            ctx.order("jp.stock.9999", 100, "x"),
            Err(EngineError::UnknownSecurity(_))
        ));
    }

    #[test]
    fn quote_reads_the_last_mark() {
        let mut ctx = configured();
        assert_eq!(ctx.quote(SYM), None);
        ctx.begin_day(day(1), [(SYM, 1234.0)]);
        assert_eq!(ctx.quote(SYM), Some(1234.0));
        assert_eq!(ctx.security(SYM).unwrap().unit(), 100);
    }

    #[test]
    fn duplicate_registrations_fail() {
        let mut ctx = configured();
        let again = ctx.configure(ChannelConfig {
            market: "jp.stock".to_string(),
            symbols: vec![],
            fields: vec![],
        });
        assert!(matches!(again, Err(EngineError::DuplicateChannel(_))));

        ctx.register_signal("s", empty_signal()).unwrap();
        let dup = ctx.register_signal("s", empty_signal());
        assert!(matches!(dup, Err(EngineError::DuplicateSignal(_))));
    }

    #[test]
    fn signal_failures_carry_the_signal_name() {
        let mut ctx = configured();
        ctx.register_signal(
            "broken",
            Box::new(|panel: &Panel| -> Result<SignalSet, SignalError> {
                panel.field("missing")?;
                Ok(SignalSet::new())
            }),
        )
        .unwrap();

        let panel = Panel::new(vec![day(1)], vec![SYM.to_string()]).unwrap();
        match ctx.evaluate_signals(&panel) {
            Err(EngineError::Signal { name, source }) => {
                assert_eq!(name, "broken");
                assert_eq!(
                    source,
                    SignalError::Panel(PanelError::MissingField(
                        "missing".to_string()
                    ))
                );
            }
            other => panic!("unexpected {:?}", other.map(|m| m.len())),
        }
    }
}
