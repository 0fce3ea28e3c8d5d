//! Relative Strength Index (RSI).
//!
//! Each value looks only at the trailing window of `period` closes, which
//! holds `period - 1` close-to-close deltas. avg_gain and avg_loss are the
//! means of the positive and absolute negative deltas inside that window.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Edge cases: avg_loss == 0 → 100; avg_gain == 0 → 0; flat window → 50.
//! Undefined for the first `period - 1` values.

use crate::{IndicatorError, Result};

pub fn rsi(closes: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod { name: "rsi" });
    }

    let n = closes.len();
    let mut result = vec![None; n];
    if n < period {
        return Ok(result);
    }

    // deltas[j] = closes[j + 1] - closes[j]
    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let window_len = (period - 1).max(1) as f64;

    // The window closes[i + 1 - period..=i] spans deltas[i + 1 - period..i].
    for (i, value) in result.iter_mut().enumerate().skip(period - 1) {
        let window = &deltas[i + 1 - period..i];
        let gains: f64 = window.iter().filter(|d| **d > 0.0).sum();
        let losses: f64 = window.iter().filter(|d| **d < 0.0).map(|d| -d).sum();
        *value = Some(from_averages(gains / window_len, losses / window_len));
    }

    Ok(result)
}

fn from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
