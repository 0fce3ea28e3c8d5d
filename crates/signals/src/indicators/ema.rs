//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (span + 1).
//! Seed: the simple average of the first `span` defined values.
//! Leading `None`s are skipped, so an EMA can be taken of another indicator's
//! output (the MACD signal line is an EMA of the MACD line).

use crate::{IndicatorError, Result};

pub fn ema(values: &[Option<f64>], span: usize) -> Result<Vec<Option<f64>>> {
    if span == 0 {
        return Err(IndicatorError::InvalidPeriod { name: "ema" });
    }

    let n = values.len();
    let mut result = vec![None; n];

    let Some(start) = values.iter().position(Option::is_some) else {
        return Ok(result);
    };
    if n - start < span {
        return Ok(result);
    }

    let mut sum = 0.0;
    for value in &values[start..start + span] {
        match value {
            Some(v) => sum += v,
            // A gap inside the seed window leaves the whole output undefined.
            None => return Ok(result),
        }
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev = sum / span as f64;
    result[start + span - 1] = Some(prev);

    for i in (start + span)..n {
        let Some(v) = values[i] else {
            break;
        };
        prev = alpha * v + (1.0 - alpha) * prev;
        result[i] = Some(prev);
    }

    Ok(result)
}
