// In crates/engine/src/cleaner.rs

use crate::error::ValidationError;
use crate::fetcher::FetchedBars;
use app_config::types::PipelineSettings;
use core_types::{Bar, Series};

/// Turns raw provider rows into a checked [`Series`], or says why it can't.
#[derive(Debug, Clone, Default)]
pub struct Cleaner {
    settings: PipelineSettings,
}

impl Cleaner {
    pub fn new(settings: PipelineSettings) -> Self {
        Self { settings }
    }

    pub fn clean(&self, fetched: FetchedBars) -> Result<Series, ValidationError> {
        // 1. Keep rows with all four prices present and finite.
        let mut bars: Vec<Bar> = fetched
            .bars
            .into_iter()
            .filter_map(|raw| {
                let price = |v: Option<f64>| v.filter(|x| x.is_finite());
                Some(Bar {
                    timestamp: raw.timestamp,
                    open: price(raw.open)?,
                    high: price(raw.high)?,
                    low: price(raw.low)?,
                    close: price(raw.close)?,
                    volume: raw.volume.filter(|v| v.is_finite()).unwrap_or(0.0),
                })
            })
            .collect();

        // 2. Order by time. The sort is stable, so among equal timestamps the
        //    later row stays later and wins the de-duplication below.
        bars.sort_by_key(|b| b.timestamp);

        // 3. Last write wins.
        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.timestamp == bar.timestamp => *last = bar,
                _ => deduped.push(bar),
            }
        }

        // 4. Sufficiency gates.
        if deduped.len() < self.settings.min_bars {
            return Err(ValidationError::TooShort {
                bars: deduped.len(),
                required: self.settings.min_bars,
            });
        }
        let closes = deduped.iter().filter(|b| b.close.is_finite()).count();
        if closes < self.settings.min_closes {
            return Err(ValidationError::NoClose {
                closes,
                required: self.settings.min_closes,
            });
        }

        Ok(Series::new(fetched.symbol, fetched.interval, deduped)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::raw_bars;
    use core_types::{Interval, Symbol};

    fn fetched(bars: Vec<core_types::RawBar>) -> FetchedBars {
        FetchedBars {
            symbol: Symbol::new("INFY.NS"),
            interval: Interval::OneDay,
            bars,
            used_fallback: false,
        }
    }

    fn rows(n: usize) -> Vec<core_types::RawBar> {
        let ohlc: Vec<_> = (0..n)
            .map(|i| {
                let c = 100.0 + i as f64;
                (c, c + 1.0, c - 1.0, c)
            })
            .collect();
        raw_bars(&ohlc)
    }

    #[test]
    fn drops_incomplete_rows_and_fills_volume() {
        let mut raw = rows(32);
        raw[3].high = None;
        raw[7].close = Some(f64::NAN);
        raw[9].volume = None;

        let series = Cleaner::default().clean(fetched(raw)).unwrap();
        assert_eq!(series.len(), 30);
        assert!(series.bars().iter().all(|b| b.close.is_finite()));
        assert!(series.bars().iter().any(|b| b.volume == 0.0));
    }

    #[test]
    fn sorts_and_keeps_last_duplicate() {
        let mut raw = rows(31);
        raw.reverse();
        // A later correction for the first bar's timestamp.
        let mut correction = raw[30];
        correction.close = Some(42.0);
        raw.push(correction);

        let series = Cleaner::default().clean(fetched(raw)).unwrap();
        assert_eq!(series.len(), 31);
        assert_eq!(series.bars()[0].close, 42.0);
        assert!(series.bars().windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn fewer_than_thirty_bars_is_too_short() {
        let err = Cleaner::default().clean(fetched(rows(29))).unwrap_err();
        assert_eq!(err, ValidationError::TooShort { bars: 29, required: 30 });
    }

    #[test]
    fn close_gate_applies_after_length_gate() {
        let cleaner = Cleaner::new(PipelineSettings {
            min_bars: 3,
            min_closes: 5,
        });
        let err = cleaner.clean(fetched(rows(4))).unwrap_err();
        assert_eq!(err, ValidationError::NoClose { closes: 4, required: 5 });
    }
}
