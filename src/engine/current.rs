use crate::data::Panel;
use crate::signal::SignalMatrix;
use chrono::NaiveDate;
use indexmap::{IndexMap, IndexSet};

//one signal channel on one date: symbol -> cell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalRow(IndexMap<String, Option<bool>>);

impl SignalRow {
    pub fn new(cells: IndexMap<String, Option<bool>>) -> Self {
        SignalRow(cells)
    }

    //the cell for `symbol`, none when absent or missing from the row
    pub fn get(&self, symbol: &str) -> Option<bool> {
        self.0.get(symbol).copied().flatten()
    }

    pub fn is_present(&self, symbol: &str) -> bool {
        self.get(symbol).is_some()
    }

    //keeps only the defined cells
    pub fn dropna(&self) -> SignalRow {
        SignalRow(
            self.0
                .iter()
                .filter(|(_, cell)| cell.is_some())
                .map(|(symbol, cell)| (symbol.clone(), *cell))
                .collect(),
        )
    }

    //defined cells in universe order
    pub fn present(&self) -> impl Iterator<Item = (&str, bool)> + '_ {
        self.0
            .iter()
            .filter_map(|(symbol, cell)| cell.map(|value| (symbol.as_str(), value)))
    }
}

//one trading day as the strategy sees it, restricted to the configured universe
#[derive(Debug, Clone)]
pub struct DailySlice {
    pub date: NaiveDate,
    pub row: usize,
    fields: IndexMap<String, IndexMap<String, Option<f64>>>,
    signals: IndexMap<String, SignalRow>,
}

impl DailySlice {
    pub fn new(
        date: NaiveDate,
        row: usize,
        fields: IndexMap<String, IndexMap<String, Option<f64>>>,
        signals: IndexMap<String, SignalRow>,
    ) -> Self {
        DailySlice {
            date,
            row,
            fields,
            signals,
        }
    }

    //cuts row `row` out of the panel and the evaluated signal matrices;
    //only the listed fields and universe symbols are kept
    pub fn extract(
        panel: &Panel,
        signals: &IndexMap<String, SignalMatrix>,
        row: usize,
        fields: &IndexSet<String>,
        universe: &IndexSet<String>,
    ) -> Option<Self> {
        let date = *panel.dates().get(row)?;

        let fields: IndexMap<String, IndexMap<String, Option<f64>>> = fields
            .iter()
            .filter_map(|name| panel.field(name).ok().map(|frame| (name, frame)))
            .map(|(name, frame)| {
                let cells = frame
                    .row(row)
                    .filter(|(symbol, _)| universe.contains(*symbol))
                    .map(|(symbol, value)| (symbol.to_string(), *value))
                    .collect();
                (name.clone(), cells)
            })
            .collect();

        let signals: IndexMap<String, SignalRow> = signals
            .iter()
            .map(|(name, matrix)| {
                let cells = matrix
                    .row(row)
                    .filter(|(symbol, _)| universe.contains(*symbol))
                    .map(|(symbol, cell)| (symbol.to_string(), *cell))
                    .collect();
                (name.clone(), SignalRow(cells))
            })
            .collect();

        Some(DailySlice::new(date, row, fields, signals))
    }

    pub fn field(&self, name: &str, symbol: &str) -> Option<f64> {
        self.fields.get(name)?.get(symbol).copied().flatten()
    }

    pub fn signal(&self, name: &str) -> Option<&SignalRow> {
        self.signals.get(name)
    }
}
