use crate::data::panel::{CLOSE_PRICE, DEFAULT_FIELDS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} window must be at least 1")]
    ZeroWindow { name: &'static str },
    #[error("{name} unit must be positive, got {value}")]
    NonPositiveUnit { name: &'static str, value: i64 },
    #[error("stock ratio ({stock}) + etf ratio ({etf}) must stay below 1")]
    AllocationOverflow { stock: f64, etf: f64 },
    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidRatio { name: &'static str, value: f64 },
    #[error("loss cut ({loss_cut}) must lie below profit take ({profit_take}) for {book}")]
    InvertedRiskBand {
        book: &'static str,
        loss_cut: f64,
        profit_take: f64,
    },
    #[error("universe has no stock codes")]
    EmptyUniverse,
    #[error("etf code {0} is also listed as a stock")]
    EtfListedAsStock(String),
    #[error("initial cash must be positive, got {0}")]
    NonPositiveCash(f64),
}

//window and threshold constants shared by the signal functions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalParams {
    pub short_window: usize,
    pub long_window: usize,
    //trend persistence is counted over this many days
    pub count_window: usize,
    pub count_threshold: u32,
    pub volume_window: usize,
    pub volume_multiple: f64,
    //max relative distance between price and moving average
    pub proximity: f64,
    pub sentiment_threshold: f64,
}

impl Default for SignalParams {
    fn default() -> Self {
        SignalParams {
            short_window: 5,
            long_window: 25,
            count_window: 20,
            count_threshold: 14,
            volume_window: 5,
            volume_multiple: 2.0,
            proximity: 0.01,
            sentiment_threshold: 0.9,
        }
    }
}

//sizing, allocation and risk limits for the daily handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    pub unit_stock: i64,
    pub unit_etf: i64,
    pub stock_ratio: f64,
    pub etf_ratio: f64,
    pub stock_loss_cut: f64,
    pub stock_profit_take: f64,
    pub etf_loss_cut: f64,
    pub etf_profit_take: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            unit_stock: 100,
            unit_etf: 100,
            stock_ratio: 0.7,
            etf_ratio: 0.2,
            stock_loss_cut: -0.08,
            stock_profit_take: 0.15,
            etf_loss_cut: -0.05,
            etf_profit_take: 0.03,
        }
    }
}

//traded symbols: `<market>.<code>` for each stock code plus the reserved etf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseConfig {
    pub market: String,
    pub stock_codes: Vec<String>,
    pub etf_code: String,
    //minimum tradable share multiple
    pub lot_size: i64,
    pub fields: Vec<String>,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        UniverseConfig {
            market: "jp.stock".to_string(),
            stock_codes: [
                "1605", "1925", "2503", "4519", "4911", "6301", "6752", "7741", "8001",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            etf_code: "1357".to_string(),
            lot_size: 100,
            fields: DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl UniverseConfig {
    pub fn symbol_for(&self, code: &str) -> String {
        format!("{}.{}", self.market, code)
    }

    pub fn etf_symbol(&self) -> String {
        self.symbol_for(&self.etf_code)
    }

    //stocks first, then the etf
    pub fn symbols(&self) -> Vec<String> {
        self.stock_codes
            .iter()
            .chain(std::iter::once(&self.etf_code))
            .map(|code| self.symbol_for(code))
            .collect()
    }

    //the etf is recognised by its trailing code segment
    pub fn is_etf(&self, symbol: &str) -> bool {
        symbol.rsplit('.').next() == Some(self.etf_code.as_str())
    }
}

//complete backtest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfiguration {
    //data
    pub data_path: PathBuf,
    pub price_field: String,

    //account settings
    pub initial_cash: f64,

    pub universe: UniverseConfig,
    pub strategy: StrategyParams,
    pub signals: SignalParams,

    //optional output paths
    pub output_orders_csv: Option<PathBuf>,
    pub output_snapshots_csv: Option<PathBuf>,
}

impl Default for BacktestConfiguration {
    fn default() -> Self {
        BacktestConfiguration {
            data_path: PathBuf::from("data.csv"),
            price_field: CLOSE_PRICE.to_string(),
            initial_cash: 10_000_000.0,
            universe: UniverseConfig::default(),
            strategy: StrategyParams::default(),
            signals: SignalParams::default(),
            output_orders_csv: None,
            output_snapshots_csv: None,
        }
    }
}

impl BacktestConfiguration {
    //load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: BacktestConfiguration = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_cash.is_nan() || self.initial_cash <= 0.0 {
            return Err(ConfigError::NonPositiveCash(self.initial_cash));
        }

        let s = &self.signals;
        for (name, window) in [
            ("short", s.short_window),
            ("long", s.long_window),
            ("count", s.count_window),
            ("volume", s.volume_window),
        ] {
            if window == 0 {
                return Err(ConfigError::ZeroWindow { name });
            }
        }

        let p = &self.strategy;
        for (name, value) in [
            ("stock", p.unit_stock),
            ("etf", p.unit_etf),
            ("lot", self.universe.lot_size),
        ] {
            if value <= 0 {
                return Err(ConfigError::NonPositiveUnit { name, value });
            }
        }

        for (name, value) in [("stock_ratio", p.stock_ratio), ("etf_ratio", p.etf_ratio)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidRatio { name, value });
            }
        }
        if p.stock_ratio + p.etf_ratio >= 1.0 {
            return Err(ConfigError::AllocationOverflow {
                stock: p.stock_ratio,
                etf: p.etf_ratio,
            });
        }

        for (book, loss_cut, profit_take) in [
            ("stocks", p.stock_loss_cut, p.stock_profit_take),
            ("etf", p.etf_loss_cut, p.etf_profit_take),
        ] {
            if loss_cut >= profit_take {
                return Err(ConfigError::InvertedRiskBand {
                    book,
                    loss_cut,
                    profit_take,
                });
            }
        }

        if self.universe.stock_codes.is_empty() {
            return Err(ConfigError::EmptyUniverse);
        }
        if self.universe.stock_codes.contains(&self.universe.etf_code) {
            return Err(ConfigError::EtfListedAsStock(self.universe.etf_code.clone()));
        }

        Ok(())
    }
}
