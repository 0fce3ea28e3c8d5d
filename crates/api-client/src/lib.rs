// In crates/api-client/src/lib.rs

use async_trait::async_trait;
use core_types::{Interval, Period, RawBar, Symbol};

pub mod error;
pub mod telegram;
pub mod types;
pub mod yahoo;

// Re-export public types
pub use error::{Error, Result};
pub use telegram::TelegramClient;
pub use yahoo::YahooClient;

/// The universal interface for a market-data source.
///
/// A provider answers one question: the bars for `symbol` at `interval` over
/// the trailing `period`. It makes no promises about ordering, duplicates or
/// missing cells; the pipeline cleans whatever comes back.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// The name of the provider (e.g., "yahoo_finance").
    fn name(&self) -> &'static str;

    async fn fetch(&self, symbol: &Symbol, interval: Interval, period: Period)
        -> Result<Vec<RawBar>>;
}

/// The universal interface for an outbound notification channel.
///
/// `Ok(())` means the channel accepted the message. Any other outcome,
/// including a non-success status, is an `Err`.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, text: &str) -> Result<()>;
}
