// In crates/core-types/src/types.rs

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A normalized instrument ticker (e.g., "RELIANCE.NS").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    /// Creates a symbol from user input, trimming whitespace and upper-casing it.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The bar width requested from the market-data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "1d")]
    OneDay,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::OneHour => "1h",
            Interval::OneDay => "1d",
        }
    }

    pub fn is_intraday(&self) -> bool {
        !matches!(self, Interval::OneDay)
    }

    /// The lookback paired with this interval: intraday bars cover a short
    /// window, daily bars a long one.
    pub fn default_period(&self) -> Period {
        if self.is_intraday() {
            Period::FiveDays
        } else {
            Period::SixMonths
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "15m" => Ok(Interval::FifteenMinutes),
            "30m" => Ok(Interval::ThirtyMinutes),
            "1h" | "60m" => Ok(Interval::OneHour),
            "1d" => Ok(Interval::OneDay),
            other => Err(Error::UnknownInterval(other.to_string())),
        }
    }
}

/// The lookback range requested from the market-data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "6mo")]
    SixMonths,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::SixMonths => "6mo",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "5d" => Ok(Period::FiveDays),
            "1mo" => Ok(Period::OneMonth),
            "6mo" => Ok(Period::SixMonths),
            other => Err(Error::UnknownPeriod(other.to_string())),
        }
    }
}

/// The classification attached to a symbol for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalKind {
    Breakout,
    Breakdown,
    Buy,
    Sell,
    Hold,
    Unavailable,
}

impl SignalKind {
    /// Only channel breaks are alert-worthy.
    pub fn is_channel_break(&self) -> bool {
        matches!(self, SignalKind::Breakout | SignalKind::Breakdown)
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SignalKind::Breakout => "Breakout",
            SignalKind::Breakdown => "Breakdown",
            SignalKind::Buy => "Buy",
            SignalKind::Sell => "Sell",
            SignalKind::Hold => "Hold",
            SignalKind::Unavailable => "Unavailable",
        };
        f.write_str(label)
    }
}

/// Outcome of the oscillator-trend rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Buy,
    Sell,
    Hold,
}

impl From<Trend> for SignalKind {
    fn from(trend: Trend) -> Self {
        match trend {
            Trend::Buy => SignalKind::Buy,
            Trend::Sell => SignalKind::Sell,
            Trend::Hold => SignalKind::Hold,
        }
    }
}

/// The high/low extremes of the bars preceding the latest one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelLevels {
    /// Highest high of the preceding window; a close above it is a breakout.
    pub breakout: f64,
    /// Lowest low of the preceding window; a close below it is a breakdown.
    pub breakdown: f64,
}

/// Indicator values at the bar a signal was evaluated on.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub sma: Option<f64>,
}

/// A classified signal for one symbol and one cycle. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub symbol: Symbol,
    /// Channel break when one fired, otherwise the trend tag.
    pub kind: SignalKind,
    /// Buy/Sell/Hold tag, always attached when indicators were available.
    pub trend: Option<Trend>,
    pub timestamp: Option<DateTime<Utc>>,
    pub price: Option<f64>,
    pub levels: Option<ChannelLevels>,
    pub snapshot: IndicatorSnapshot,
    /// Why the signal is `Unavailable`, if it is.
    pub reason: Option<String>,
}

impl SignalEvent {
    /// A terminal event for a symbol whose pipeline could not complete.
    pub fn unavailable(symbol: Symbol, reason: impl Into<String>) -> Self {
        Self {
            symbol,
            kind: SignalKind::Unavailable,
            trend: None,
            timestamp: None,
            price: None,
            levels: None,
            snapshot: IndicatorSnapshot::default(),
            reason: Some(reason.into()),
        }
    }

    /// The level a channel break crossed, if any.
    pub fn triggering_level(&self) -> Option<f64> {
        let levels = self.levels?;
        match self.kind {
            SignalKind::Breakout => Some(levels.breakout),
            SignalKind::Breakdown => Some(levels.breakdown),
            _ => None,
        }
    }
}
