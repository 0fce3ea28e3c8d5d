// In crates/signals/src/error.rs

use thiserror::Error;

/// Raised for malformed input or settings; a cleaned series with validated
/// settings never triggers it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Indicator period for {name} must be greater than 0")]
    InvalidPeriod { name: &'static str },

    #[error("MACD fast period ({fast}) must be shorter than the slow period ({slow})")]
    InvalidMacdPeriods { fast: usize, slow: usize },

    #[error("RSI oversold level ({oversold}) must sit below the overbought level ({overbought}) within 0..=100")]
    InvalidRsiThresholds { oversold: f64, overbought: f64 },

    #[error("Close at bar {index} is not a finite number")]
    NonFiniteClose { index: usize },
}

pub type Result<T> = std::result::Result<T, IndicatorError>;
