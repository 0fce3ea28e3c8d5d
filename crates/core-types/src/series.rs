// In crates/core-types/src/series.rs

use crate::{Error, Interval, Result, Symbol};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bar as delivered by a provider, before cleaning. Any field may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub timestamp: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

/// A single cleaned OHLCV bar. All prices are finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// An ordered run of bars for one symbol, strictly increasing by timestamp.
///
/// The only way to build a `Series` is through [`Series::new`], which checks the
/// ordering and finiteness invariants, and there are no mutable accessors, so a
/// series handed downstream cannot change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    symbol: Symbol,
    interval: Interval,
    bars: Vec<Bar>,
}

impl Series {
    pub fn new(symbol: Symbol, interval: Interval, bars: Vec<Bar>) -> Result<Self> {
        for (index, bar) in bars.iter().enumerate() {
            let fields = [
                ("open", bar.open),
                ("high", bar.high),
                ("low", bar.low),
                ("close", bar.close),
                ("volume", bar.volume),
            ];
            if let Some((field, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
                return Err(Error::NonFiniteValue { index, field });
            }
            if index > 0 && bars[index - 1].timestamp >= bar.timestamp {
                return Err(Error::UnorderedBars { index });
            }
        }

        Ok(Self {
            symbol,
            interval,
            bars,
        })
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// The interval the bars actually have, which differs from the requested
    /// one when the daily fallback tier was used.
    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn latest(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}
