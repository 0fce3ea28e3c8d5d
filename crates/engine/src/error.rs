// In crates/engine/src/error.rs

use signals::IndicatorError;
use thiserror::Error;

/// Why no usable bars came back for a symbol.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("provider failure: {0}")]
    ProviderFailure(String),
    #[error("no data in the requested or the fallback range")]
    Unavailable,
}

/// Why the fetched bars cannot be analysed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("only {bars} clean bars, need at least {required}")]
    TooShort { bars: usize, required: usize },
    #[error("only {closes} closing prices, need at least {required}")]
    NoClose { closes: usize, required: usize },
    #[error("cleaned bars rejected: {0}")]
    Malformed(#[from] core_types::Error),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("notification credentials are missing")]
    CredentialsMissing,
    #[error("transport failure: {0}")]
    TransportFailure(String),
    #[error("notification rejected with HTTP status {0}")]
    NonSuccessStatus(u16),
}

/// Everything that can end a symbol's run early. Caught at the per-symbol
/// boundary and turned into an `Unavailable` signal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SymbolError {
    #[error("data unavailable: {0}")]
    Fetch(#[from] FetchError),
    #[error("insufficient data: {0}")]
    Validation(#[from] ValidationError),
    #[error("indicator failure: {0}")]
    Indicator(#[from] IndicatorError),
}
