// In crates/core-types/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Bars are not strictly increasing by timestamp at index {index}")]
    UnorderedBars { index: usize },

    #[error("Bar {index} has a non-finite {field} value")]
    NonFiniteValue { index: usize, field: &'static str },

    #[error("Unknown interval: {0}")]
    UnknownInterval(String),

    #[error("Unknown period: {0}")]
    UnknownPeriod(String),
}

pub type Result<T> = std::result::Result<T, Error>;
