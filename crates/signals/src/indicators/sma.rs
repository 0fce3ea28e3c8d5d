//! Simple Moving Average (SMA).
//!
//! Rolling mean of the trailing `period` values.
//! Undefined for the first `period - 1` values.

use crate::{IndicatorError, Result};
use ta::Next;
use ta::indicators::SimpleMovingAverage;

pub fn sma(values: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    // `ta` averages over however many values it has seen so far, so the
    // warm-up outputs are masked rather than reported as partial means.
    let mut indicator =
        SimpleMovingAverage::new(period).map_err(|_| IndicatorError::InvalidPeriod { name: "sma" })?;

    Ok(values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let mean = indicator.next(value);
            (i + 1 >= period).then_some(mean)
        })
        .collect())
}
