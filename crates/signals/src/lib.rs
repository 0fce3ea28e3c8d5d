// In crates/signals/src/lib.rs

//! Technical indicators and the signal classifier.
//!
//! Everything here is a pure function of a cleaned [`core_types::Series`]:
//! no I/O, no clocks, no state carried between calls.

pub mod classifier;
pub mod error;
pub mod indicators;
pub mod types;

pub use classifier::{SignalClassifier, channel_levels};
pub use error::{IndicatorError, Result};
pub use indicators::{IndicatorEngine, IndicatorSet};
pub use types::{ClassifierSettings, IndicatorSettings};
