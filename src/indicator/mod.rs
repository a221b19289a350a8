pub mod rolling;

use crate::data::FieldFrame;

pub use rolling::{rolling_average, rolling_sum, IndicatorError};

//rolling trailing sum applied to every symbol column independently
pub fn rolling_sum_frame(frame: &FieldFrame, window: usize) -> Result<FieldFrame, IndicatorError> {
    frame.try_map_columns(|column| rolling_sum(column, window))
}

//rolling trailing average applied to every symbol column independently
pub fn rolling_average_frame(
    frame: &FieldFrame,
    window: usize,
) -> Result<FieldFrame, IndicatorError> {
    frame.try_map_columns(|column| rolling_average(column, window))
}
