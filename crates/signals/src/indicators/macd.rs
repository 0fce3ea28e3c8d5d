//! Moving Average Convergence Divergence (MACD).
//!
//! line = EMA(fast) - EMA(slow) of close; signal = EMA(signal) of the line;
//! histogram = line - signal.

use super::ema::ema;
use crate::{IndicatorError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub line: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Result<Macd> {
    if fast >= slow {
        return Err(IndicatorError::InvalidMacdPeriods { fast, slow });
    }

    let closes: Vec<Option<f64>> = closes.iter().copied().map(Some).collect();
    let fast_ema = ema(&closes, fast)?;
    let slow_ema = ema(&closes, slow)?;

    let line: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal_line = ema(&line, signal)?;
    let histogram = line
        .iter()
        .zip(&signal_line)
        .map(|(l, s)| Some((*l)? - (*s)?))
        .collect();

    Ok(Macd {
        line,
        signal: signal_line,
        histogram,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    /// A straightforward EMA written independently of `ema::ema`.
    fn reference_ema(values: &[f64], span: usize) -> Vec<Option<f64>> {
        let alpha = 2.0 / (span as f64 + 1.0);
        let mut out = vec![None; values.len()];
        let mut prev: Option<f64> = None;
        for (i, v) in values.iter().enumerate() {
            if i + 1 < span {
                continue;
            }
            let next = match prev {
                None => values[..span].iter().sum::<f64>() / span as f64,
                Some(p) => alpha * v + (1.0 - alpha) * p,
            };
            out[i] = Some(next);
            prev = Some(next);
        }
        out
    }

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.4).sin() * 5.0 + i as f64 * 0.1)
            .collect()
    }

    #[test]
    fn line_is_fast_minus_slow_ema() {
        let closes = wave(60);
        let result = macd(&closes, 12, 26, 9).unwrap();
        let fast = reference_ema(&closes, 12);
        let slow = reference_ema(&closes, 26);

        assert!(result.line[..25].iter().all(Option::is_none));
        for i in 25..closes.len() {
            let expected = fast[i].unwrap() - slow[i].unwrap();
            assert_approx(result.line[i].unwrap(), expected, 1e-9);
        }
    }

    #[test]
    fn signal_starts_after_line_warm_up() {
        let result = macd(&wave(60), 12, 26, 9).unwrap();
        // Line defined from 25, signal needs 9 line values → first at 33.
        assert!(result.signal[..33].iter().all(Option::is_none));
        assert!(result.signal[33].is_some());
        assert!(result.histogram[32].is_none());
        let hist = result.histogram[40].unwrap();
        assert_approx(
            hist,
            result.line[40].unwrap() - result.signal[40].unwrap(),
            1e-12,
        );
    }

    #[test]
    fn fast_must_be_shorter_than_slow() {
        assert_eq!(
            macd(&wave(40), 26, 12, 9),
            Err(IndicatorError::InvalidMacdPeriods { fast: 26, slow: 12 })
        );
    }
}
