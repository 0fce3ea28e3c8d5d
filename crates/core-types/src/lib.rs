// In crates/core-types/src/lib.rs

pub mod error;
pub mod series;
pub mod types;

// Re-export the most important types for easy access from other crates.
pub use error::{Error, Result};
pub use series::{Bar, RawBar, Series};
pub use types::{
    ChannelLevels, IndicatorSnapshot, Interval, Period, SignalEvent, SignalKind, Symbol, Trend,
};
