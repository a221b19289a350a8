use crate::data::panel::PanelError;
use chrono::NaiveDate;
use rayon::prelude::*;

//a date x symbol table stored column-major (one vec per symbol)
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<T> {
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    columns: Vec<Vec<T>>,
}

//numeric observations, none marks a missing cell
pub type FieldFrame = Frame<Option<f64>>;

impl<T> Frame<T> {
    //builds a frame, checking every column matches the date axis
    pub fn from_columns(
        dates: Vec<NaiveDate>,
        symbols: Vec<String>,
        columns: Vec<Vec<T>>,
    ) -> Result<Self, PanelError> {
        if symbols.len() != columns.len() {
            return Err(PanelError::ColumnCount {
                expected: symbols.len(),
                actual: columns.len(),
            });
        }

        for (symbol, column) in symbols.iter().zip(&columns) {
            if column.len() != dates.len() {
                return Err(PanelError::ColumnLength {
                    symbol: symbol.clone(),
                    expected: dates.len(),
                    actual: column.len(),
                });
            }
        }

        Ok(Frame {
            dates,
            symbols,
            columns,
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn num_rows(&self) -> usize {
        self.dates.len()
    }

    pub fn column(&self, symbol: &str) -> Option<&[T]> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .map(|j| self.columns[j].as_slice())
    }

    pub fn get(&self, row: usize, symbol: &str) -> Option<&T> {
        self.column(symbol).and_then(|column| column.get(row))
    }

    //iterates one date's cells in symbol order
    pub fn row(&self, row: usize) -> impl Iterator<Item = (&str, &T)> + '_ {
        self.symbols
            .iter()
            .zip(&self.columns)
            .filter_map(move |(symbol, column)| column.get(row).map(|v| (symbol.as_str(), v)))
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[T])> + '_ {
        self.symbols
            .iter()
            .zip(&self.columns)
            .map(|(symbol, column)| (symbol.as_str(), column.as_slice()))
    }

    fn same_shape<U>(&self, other: &Frame<U>) -> Result<(), PanelError> {
        if self.dates != other.dates || self.symbols != other.symbols {
            return Err(PanelError::ShapeMismatch {
                left: (self.dates.len(), self.symbols.len()),
                right: (other.dates.len(), other.symbols.len()),
            });
        }
        Ok(())
    }
}

impl<T: Clone> Frame<T> {
    //keeps the first `rows` dates
    pub fn head(&self, rows: usize) -> Self {
        let rows = rows.min(self.dates.len());
        Frame {
            dates: self.dates[..rows].to_vec(),
            symbols: self.symbols.clone(),
            columns: self.columns.iter().map(|c| c[..rows].to_vec()).collect(),
        }
    }
}

impl<T: Sync> Frame<T> {
    //applies a whole-column transform to every symbol in parallel
    //the transform must preserve the column length
    pub fn try_map_columns<U, E, F>(&self, f: F) -> Result<Frame<U>, E>
    where
        U: Send,
        E: Send,
        F: Fn(&[T]) -> Result<Vec<U>, E> + Sync + Send,
    {
        let columns = self
            .columns
            .par_iter()
            .map(|column| f(column))
            .collect::<Result<Vec<_>, E>>()?;

        Ok(Frame {
            dates: self.dates.clone(),
            symbols: self.symbols.clone(),
            columns,
        })
    }

    pub fn map_columns<U, F>(&self, f: F) -> Frame<U>
    where
        U: Send,
        F: Fn(&[T]) -> Vec<U> + Sync + Send,
    {
        let columns = self.columns.par_iter().map(|column| f(column)).collect();

        Frame {
            dates: self.dates.clone(),
            symbols: self.symbols.clone(),
            columns,
        }
    }

    //elementwise transform
    pub fn map<U, F>(&self, f: F) -> Frame<U>
    where
        U: Send,
        F: Fn(&T) -> U + Sync + Send,
    {
        let columns = self
            .columns
            .par_iter()
            .map(|column| column.iter().map(&f).collect::<Vec<U>>())
            .collect();

        Frame {
            dates: self.dates.clone(),
            symbols: self.symbols.clone(),
            columns,
        }
    }

    //combines two frames of identical shape cell by cell
    pub fn zip_with<U, V, F>(&self, other: &Frame<U>, f: F) -> Result<Frame<V>, PanelError>
    where
        U: Sync,
        V: Send,
        F: Fn(&T, &U) -> V + Sync + Send,
    {
        self.same_shape(other)?;

        let columns = self
            .columns
            .par_iter()
            .zip(other.columns.par_iter())
            .map(|(left, right)| {
                left.iter()
                    .zip(right)
                    .map(|(a, b)| f(a, b))
                    .collect::<Vec<V>>()
            })
            .collect();

        Ok(Frame {
            dates: self.dates.clone(),
            symbols: self.symbols.clone(),
            columns,
        })
    }
}

impl FieldFrame {
    pub fn forward_fill(&self) -> Self {
        self.map_columns(forward_fill)
    }
}

//replaces each missing observation with the last one seen before it
//leading gaps stay missing
pub fn forward_fill(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut last = None;
    values
        .iter()
        .map(|value| {
            if value.is_some() {
                last = *value;
            }
            last
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2018, 1, 4).unwrap();
        (0..n)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect()
    }

    #[test]
    fn forward_fill_keeps_leading_gap() {
        let filled = forward_fill(&[None, Some(1.0), None, None, Some(3.0), None]);
        assert_eq!(
            filled,
            vec![None, Some(1.0), Some(1.0), Some(1.0), Some(3.0), Some(3.0)]
        );
    }

    #[test]
    fn rejects_short_column() {
        let err = Frame::from_columns(
            dates(3),
            vec!["a".to_string()],
            vec![vec![Some(1.0), Some(2.0)]],
        )
        .unwrap_err();
        assert!(matches!(err, PanelError::ColumnLength { actual: 2, .. }));
    }

    #[test]
    fn zip_with_requires_same_shape() {
        let left = Frame::from_columns(dates(2), vec!["a".into()], vec![vec![1, 2]]).unwrap();
        let right = Frame::from_columns(dates(3), vec!["a".into()], vec![vec![1, 2, 3]]).unwrap();
        assert!(left.zip_with(&right, |a, b| a + b).is_err());

        let same = Frame::from_columns(dates(2), vec!["a".into()], vec![vec![10, 20]]).unwrap();
        let sum = left.zip_with(&same, |a, b| a + b).unwrap();
        assert_eq!(sum.column("a"), Some(&[11, 22][..]));
    }

    #[test]
    fn row_walks_symbols_in_order() {
        let frame = Frame::from_columns(
            dates(2),
            vec!["b".into(), "a".into()],
            vec![vec![1, 2], vec![3, 4]],
        )
        .unwrap();
        let row: Vec<_> = frame.row(1).map(|(s, v)| (s.to_string(), *v)).collect();
        assert_eq!(row, vec![("b".to_string(), 2), ("a".to_string(), 4)]);
    }

    #[test]
    fn head_truncates_dates() {
        let frame = Frame::from_columns(dates(3), vec!["a".into()], vec![vec![1, 2, 3]]).unwrap();
        let head = frame.head(2);
        assert_eq!(head.num_rows(), 2);
        assert_eq!(head.column("a"), Some(&[1, 2][..]));
    }
}
