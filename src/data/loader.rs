use crate::data::panel::{Panel, PanelBuilder};
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::path::Path;

const DATE_COLUMN: &str = "date";
const SYMBOL_COLUMN: &str = "symbol";

//loads a panel from a csv file with header `date,symbol,<field>...`
//one row per (date, symbol); empty or nan cells are absent observations
pub fn load_panel_csv<P: AsRef<Path>>(path: P) -> Result<Panel> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;

    let headers = reader
        .headers()
        .context(format!("Failed to read CSV header from {:?}", path))?
        .clone();

    let date_idx = headers.iter().position(|h| h == DATE_COLUMN);
    let symbol_idx = headers.iter().position(|h| h == SYMBOL_COLUMN);
    let (date_idx, symbol_idx) = match (date_idx, symbol_idx) {
        (Some(d), Some(s)) => (d, s),
        _ => bail!("CSV header must contain `date` and `symbol` columns: {:?}", path),
    };

    //every other column is a panel field
    let field_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != date_idx && *i != symbol_idx)
        .map(|(i, name)| (i, name.to_string()))
        .collect();

    let mut builder = field_columns
        .iter()
        .fold(PanelBuilder::new(), |builder, (_, name)| builder.field(name));

    for (index, result) in reader.records().enumerate() {
        let line = index + 2;
        let record = result.context(format!("Failed to parse CSV record at line {}", line))?;

        let raw_date = record.get(date_idx).unwrap_or_default();
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").context(format!(
            "Failed to parse date '{}' at line {}",
            raw_date, line
        ))?;

        let symbol = record.get(symbol_idx).unwrap_or_default();
        if symbol.is_empty() {
            bail!("Empty symbol at line {}", line);
        }

        for (column, field) in &field_columns {
            let raw = record.get(*column).unwrap_or_default();
            let value = parse_cell(raw).context(format!(
                "Failed to parse {} value '{}' at line {}",
                field, raw, line
            ))?;
            builder.record(date, symbol, field, value);
        }
    }

    let panel = builder.build()?;
    log::info!(
        "loaded panel from {:?}: {} dates, {} symbols, fields [{}]",
        path,
        panel.num_dates(),
        panel.symbols().len(),
        panel.field_names().collect::<Vec<_>>().join(", ")
    );

    Ok(panel)
}

fn parse_cell(raw: &str) -> Result<Option<f64>> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    let value: f64 = raw.parse()?;
    Ok(if value.is_nan() { None } else { Some(value) })
}
