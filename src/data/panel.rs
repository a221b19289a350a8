use crate::data::frame::{FieldFrame, Frame};
use chrono::NaiveDate;
use indexmap::{IndexMap, IndexSet};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

pub const CLOSE_PRICE: &str = "close_price_adj";
pub const VOLUME: &str = "volume_adj";
pub const FEAR: &str = "ns_fear";
pub const OPTIMISM: &str = "ns_optimism";

//fields the bundled strategy consumes
pub const DEFAULT_FIELDS: [&str; 4] = [CLOSE_PRICE, VOLUME, FEAR, OPTIMISM];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PanelError {
    #[error("expected {expected} symbol columns, got {actual}")]
    ColumnCount { expected: usize, actual: usize },
    #[error("column {symbol} has {actual} rows, expected {expected}")]
    ColumnLength {
        symbol: String,
        expected: usize,
        actual: usize,
    },
    #[error("frame shapes differ: {left:?} vs {right:?} (dates, symbols)")]
    ShapeMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },
    #[error("dates must be strictly ascending (row {row}: {date})")]
    UnorderedDates { row: usize, date: NaiveDate },
    #[error("missing panel field: {0}")]
    MissingField(String),
}

//field name -> (date x symbol) table, all sharing one date and symbol axis
#[derive(Debug, Clone, Default)]
pub struct Panel {
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    fields: IndexMap<String, FieldFrame>,
}

impl Panel {
    pub fn new(dates: Vec<NaiveDate>, symbols: Vec<String>) -> Result<Self, PanelError> {
        for (row, pair) in dates.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(PanelError::UnorderedDates {
                    row: row + 1,
                    date: pair[1],
                });
            }
        }

        Ok(Panel {
            dates,
            symbols,
            fields: IndexMap::new(),
        })
    }

    //adds or replaces a field given one column per symbol (in panel symbol order)
    pub fn insert_columns(
        &mut self,
        name: impl Into<String>,
        columns: Vec<Vec<Option<f64>>>,
    ) -> Result<(), PanelError> {
        let frame = Frame::from_columns(self.dates.clone(), self.symbols.clone(), columns)?;
        self.fields.insert(name.into(), frame);
        Ok(())
    }

    pub fn field(&self, name: &str) -> Result<&FieldFrame, PanelError> {
        self.fields
            .get(name)
            .ok_or_else(|| PanelError::MissingField(name.to_string()))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.keys().map(String::as_str)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn num_dates(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    //the history visible on the `rows`-th trading day
    pub fn head(&self, rows: usize) -> Panel {
        let rows = rows.min(self.dates.len());
        Panel {
            dates: self.dates[..rows].to_vec(),
            symbols: self.symbols.clone(),
            fields: self
                .fields
                .iter()
                .map(|(name, frame)| (name.clone(), frame.head(rows)))
                .collect(),
        }
    }
}

//collects scattered observations and lays them out on a dense panel
#[derive(Debug, Default)]
pub struct PanelBuilder {
    dates: BTreeSet<NaiveDate>,
    symbols: IndexSet<String>,
    fields: IndexSet<String>,
    cells: HashMap<(NaiveDate, usize, usize), f64>,
}

impl PanelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    //declares a field even if no observation for it ever arrives
    pub fn field(mut self, name: &str) -> Self {
        self.fields.insert(name.to_string());
        self
    }

    pub fn symbol(mut self, symbol: &str) -> Self {
        self.symbols.insert(symbol.to_string());
        self
    }

    //records one cell, none leaves it absent
    pub fn record(&mut self, date: NaiveDate, symbol: &str, field: &str, value: Option<f64>) {
        self.dates.insert(date);
        let (symbol_idx, _) = self.symbols.insert_full(symbol.to_string());
        let (field_idx, _) = self.fields.insert_full(field.to_string());

        if let Some(value) = value {
            self.cells.insert((date, symbol_idx, field_idx), value);
        }
    }

    pub fn build(self) -> Result<Panel, PanelError> {
        let dates: Vec<NaiveDate> = self.dates.into_iter().collect();
        let symbols: Vec<String> = self.symbols.into_iter().collect();
        let mut panel = Panel::new(dates.clone(), symbols.clone())?;

        for (field_idx, field) in self.fields.iter().enumerate() {
            let columns = (0..symbols.len())
                .map(|symbol_idx| {
                    dates
                        .iter()
                        .map(|date| self.cells.get(&(*date, symbol_idx, field_idx)).copied())
                        .collect()
                })
                .collect();
            panel.insert_columns(field.clone(), columns)?;
        }

        Ok(panel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 1, d).unwrap()
    }

    #[test]
    fn rejects_unordered_dates() {
        let err = Panel::new(vec![day(5), day(4)], vec![]).unwrap_err();
        assert_eq!(
            err,
            PanelError::UnorderedDates {
                row: 1,
                date: day(4)
            }
        );
    }

    #[test]
    fn builder_sorts_dates_and_leaves_gaps_absent() {
        let mut builder = PanelBuilder::new();
        builder.record(day(5), "jp.stock.1", CLOSE_PRICE, Some(101.0));
        builder.record(day(4), "jp.stock.1", CLOSE_PRICE, Some(100.0));
        builder.record(day(4), "jp.stock.2", CLOSE_PRICE, None);
        let panel = builder.build().unwrap();

        assert_eq!(panel.dates(), &[day(4), day(5)]);
        let close = panel.field(CLOSE_PRICE).unwrap();
        assert_eq!(close.column("jp.stock.1"), Some(&[Some(100.0), Some(101.0)][..]));
        assert_eq!(close.column("jp.stock.2"), Some(&[None, None][..]));
    }

    #[test]
    fn missing_field_is_reported() {
        let panel = PanelBuilder::new().field(CLOSE_PRICE).build().unwrap();
        assert!(panel.field(CLOSE_PRICE).is_ok());
        assert_eq!(
            panel.field(VOLUME).unwrap_err(),
            PanelError::MissingField(VOLUME.to_string())
        );
    }

    #[test]
    fn head_is_a_prefix() {
        let mut builder = PanelBuilder::new();
        for d in 4..9 {
            builder.record(day(d), "s", CLOSE_PRICE, Some(d as f64));
        }
        let panel = builder.build().unwrap();
        let head = panel.head(2);
        assert_eq!(head.num_dates(), 2);
        assert_eq!(
            head.field(CLOSE_PRICE).unwrap().column("s"),
            Some(&[Some(4.0), Some(5.0)][..])
        );
    }
}
