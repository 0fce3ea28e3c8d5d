//! Indicator computation over a cleaned series.
//!
//! Each indicator is a pure function from closes to a vector aligned 1:1 with
//! the input, `None` for warm-up positions. [`IndicatorEngine`] bundles the
//! configured set into an [`IndicatorSet`].

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

use crate::types::IndicatorSettings;
use crate::{IndicatorError, Result};
use core_types::{IndicatorSnapshot, Series};
use serde::Serialize;

/// Derived values for one series. Read-only once computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSet {
    rsi: Vec<Option<f64>>,
    macd: Vec<Option<f64>>,
    macd_signal: Vec<Option<f64>>,
    macd_histogram: Vec<Option<f64>>,
    sma: Vec<Option<f64>>,
}

impl IndicatorSet {
    pub fn rsi(&self) -> &[Option<f64>] {
        &self.rsi
    }

    pub fn macd(&self) -> &[Option<f64>] {
        &self.macd
    }

    pub fn macd_signal(&self) -> &[Option<f64>] {
        &self.macd_signal
    }

    pub fn macd_histogram(&self) -> &[Option<f64>] {
        &self.macd_histogram
    }

    pub fn sma(&self) -> &[Option<f64>] {
        &self.sma
    }

    /// Number of bars the set is aligned with.
    pub fn len(&self) -> usize {
        self.rsi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rsi.is_empty()
    }

    /// Values at bar `index`; out-of-range indices yield an empty snapshot.
    pub fn snapshot_at(&self, index: usize) -> IndicatorSnapshot {
        let at = |values: &[Option<f64>]| values.get(index).copied().flatten();
        IndicatorSnapshot {
            rsi: at(&self.rsi),
            macd: at(&self.macd),
            macd_signal: at(&self.macd_signal),
            sma: at(&self.sma),
        }
    }

    pub fn latest(&self) -> IndicatorSnapshot {
        match self.len() {
            0 => IndicatorSnapshot::default(),
            n => self.snapshot_at(n - 1),
        }
    }
}

/// Computes RSI, MACD and SMA with the configured periods.
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    settings: IndicatorSettings,
}

impl IndicatorEngine {
    pub fn new(settings: IndicatorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &IndicatorSettings {
        &self.settings
    }

    pub fn compute(&self, series: &Series) -> Result<IndicatorSet> {
        self.compute_closes(&series.closes())
    }

    pub fn compute_closes(&self, closes: &[f64]) -> Result<IndicatorSet> {
        if let Some(index) = closes.iter().position(|c| !c.is_finite()) {
            return Err(IndicatorError::NonFiniteClose { index });
        }

        let s = &self.settings;
        let macd = macd::macd(closes, s.macd_fast, s.macd_slow, s.macd_signal)?;

        Ok(IndicatorSet {
            rsi: rsi::rsi(closes, s.rsi_period)?,
            macd: macd.line,
            macd_signal: macd.signal,
            macd_histogram: macd.histogram,
            sma: sma::sma(closes, s.sma_period)?,
        })
    }
}

/// Builds a series from closes for tests.
///
/// open = previous close (or close for the first bar),
/// high = max(open, close) + 1.0, low = min(open, close) - 1.0, volume = 1000.
#[cfg(test)]
pub(crate) fn make_series(closes: &[f64]) -> Series {
    use chrono::{Duration, TimeZone, Utc};
    use core_types::{Bar, Interval, Symbol};

    let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect();
    Series::new(Symbol::new("TEST"), Interval::OneDay, bars).unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub(crate) fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub(crate) const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    fn rising(n: usize, from: f64, to: f64) -> Vec<f64> {
        let step = (to - from) / (n - 1) as f64;
        (0..n).map(|i| from + step * i as f64).collect()
    }

    #[test]
    fn all_indicators_align_with_series() {
        let series = make_series(&rising(40, 100.0, 140.0));
        let set = IndicatorEngine::default().compute(&series).unwrap();

        assert_eq!(set.len(), 40);
        assert_eq!(set.sma().len(), 40);
        assert_eq!(set.macd().len(), 40);
        assert_eq!(set.macd_signal().len(), 40);
        assert_eq!(set.macd_histogram().len(), 40);
    }

    #[test]
    fn warm_up_positions_are_undefined() {
        let series = make_series(&rising(40, 100.0, 140.0));
        let set = IndicatorEngine::default().compute(&series).unwrap();

        assert!(set.sma()[..19].iter().all(Option::is_none));
        assert!(set.sma()[19].is_some());
        assert!(set.rsi()[..13].iter().all(Option::is_none));
        assert!(set.rsi()[13].is_some());
        assert!(set.macd()[..25].iter().all(Option::is_none));
        assert!(set.macd()[25].is_some());
        assert!(set.macd_signal()[..33].iter().all(Option::is_none));
        assert!(set.macd_signal()[33].is_some());
    }

    #[test]
    fn steady_rise_scenario() {
        let closes = rising(40, 100.0, 140.0);
        let series = make_series(&closes);
        let set = IndicatorEngine::default().compute(&series).unwrap();
        let latest = set.latest();

        let recent_mean = closes[20..].iter().sum::<f64>() / 20.0;
        assert_approx(latest.sma.unwrap(), recent_mean, 1e-9);

        for rsi in &set.rsi()[27..] {
            assert!(rsi.unwrap() > 70.0);
        }
        assert!(latest.macd.unwrap() > 0.0);
    }

    #[test]
    fn recomputation_is_bit_identical() {
        let closes: Vec<f64> = (0..80)
            .map(|i| 50.0 + (i as f64 * 0.7).cos() * 3.0)
            .collect();
        let engine = IndicatorEngine::default();
        let first = engine.compute_closes(&closes).unwrap();
        let second = engine.compute_closes(&closes).unwrap();

        let bits = |v: &[Option<f64>]| v.iter().map(|x| x.map(f64::to_bits)).collect::<Vec<_>>();
        assert_eq!(bits(first.rsi()), bits(second.rsi()));
        assert_eq!(bits(first.macd()), bits(second.macd()));
        assert_eq!(bits(first.macd_signal()), bits(second.macd_signal()));
        assert_eq!(bits(first.sma()), bits(second.sma()));
    }

    #[test]
    fn non_finite_close_is_rejected() {
        let err = IndicatorEngine::default()
            .compute_closes(&[1.0, f64::NAN, 3.0])
            .unwrap_err();
        assert_eq!(err, IndicatorError::NonFiniteClose { index: 1 });
    }

    #[test]
    fn snapshot_out_of_range_is_empty() {
        let set = IndicatorEngine::default().compute_closes(&[1.0, 2.0]).unwrap();
        assert_eq!(set.snapshot_at(10), IndicatorSnapshot::default());
    }
}
