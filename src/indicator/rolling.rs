use statrs::statistics::Statistics;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorError {
    #[error("rolling window must be at least 1")]
    ZeroWindow,
}

//aggregates the `window` observations strictly before each index.
//indices with fewer than `window` predecessors keep their own value,
//and a gap inside the window leaves the output absent
fn rolling<F>(
    values: &[Option<f64>],
    window: usize,
    aggregate: F,
) -> Result<Vec<Option<f64>>, IndicatorError>
where
    F: Fn(&[f64]) -> f64,
{
    if window == 0 {
        return Err(IndicatorError::ZeroWindow);
    }

    let mut out = values.to_vec();
    for i in window..values.len() {
        let complete: Option<Vec<f64>> = values[i - window..i].iter().copied().collect();
        out[i] = complete.map(|w| aggregate(&w));
    }
    Ok(out)
}

fn sum(window: &[f64]) -> f64 {
    window.iter().sum()
}

fn mean(window: &[f64]) -> f64 {
    window.mean()
}

pub fn rolling_sum(
    values: &[Option<f64>],
    window: usize,
) -> Result<Vec<Option<f64>>, IndicatorError> {
    rolling(values, window, sum)
}

pub fn rolling_average(
    values: &[Option<f64>],
    window: usize,
) -> Result<Vec<Option<f64>>, IndicatorError> {
    rolling(values, window, mean)
}
