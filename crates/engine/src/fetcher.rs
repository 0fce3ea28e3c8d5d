// In crates/engine/src/fetcher.rs

use crate::error::FetchError;
use api_client::MarketDataProvider;
use core_types::{Interval, Period, RawBar, Symbol};
use std::time::Duration;
use tracing::{debug, warn};

/// The tier asked for when the configured one comes back empty.
pub const FALLBACK_TIER: (Interval, Period) = (Interval::OneDay, Period::OneMonth);

/// Raw provider bars together with the interval they were actually fetched at.
#[derive(Debug, Clone)]
pub struct FetchedBars {
    pub symbol: Symbol,
    pub interval: Interval,
    pub bars: Vec<RawBar>,
    pub used_fallback: bool,
}

/// Wraps a provider with a per-call timeout and the daily fallback tier.
pub struct DataFetcher {
    provider: Box<dyn MarketDataProvider>,
    timeout: Duration,
}

impl DataFetcher {
    pub fn new(provider: Box<dyn MarketDataProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Fetches the configured tier, falling back to `FALLBACK_TIER` at most once.
    ///
    /// A tier counts as usable only if at least one bar carries a close.
    pub async fn fetch(
        &self,
        symbol: &Symbol,
        interval: Interval,
        period: Period,
    ) -> Result<FetchedBars, FetchError> {
        let primary = self.fetch_tier(symbol, interval, period).await;
        let primary_failure = match primary {
            Ok(bars) if has_close(&bars) => {
                return Ok(FetchedBars {
                    symbol: symbol.clone(),
                    interval,
                    bars,
                    used_fallback: false,
                });
            }
            Ok(bars) => {
                debug!(symbol = %symbol, rows = bars.len(), "Requested tier returned no closes.");
                None
            }
            Err(e) => {
                warn!(symbol = %symbol, %interval, %period, error = %e, "Requested tier failed.");
                Some(e)
            }
        };

        let (fb_interval, fb_period) = FALLBACK_TIER;
        if (interval, period) == FALLBACK_TIER {
            return Err(primary_failure.unwrap_or(FetchError::Unavailable));
        }

        warn!(symbol = %symbol, %interval, "No data for the requested interval, using daily fallback.");
        match self.fetch_tier(symbol, fb_interval, fb_period).await {
            Ok(bars) if has_close(&bars) => Ok(FetchedBars {
                symbol: symbol.clone(),
                interval: fb_interval,
                bars,
                used_fallback: true,
            }),
            Ok(_) => Err(FetchError::Unavailable),
            Err(e) => Err(e),
        }
    }

    async fn fetch_tier(
        &self,
        symbol: &Symbol,
        interval: Interval,
        period: Period,
    ) -> Result<Vec<RawBar>, FetchError> {
        match tokio::time::timeout(self.timeout, self.provider.fetch(symbol, interval, period)).await {
            Ok(Ok(bars)) => Ok(bars),
            Ok(Err(e)) => Err(FetchError::ProviderFailure(e.to_string())),
            Err(_) => Err(FetchError::ProviderFailure(format!(
                "timed out after {:?}",
                self.timeout
            ))),
        }
    }
}

fn has_close(bars: &[RawBar]) -> bool {
    bars.iter().any(|b| b.close.is_some_and(f64::is_finite))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeProvider, Reply, raw_bars};

    fn fetcher(provider: FakeProvider) -> DataFetcher {
        DataFetcher::new(Box::new(provider), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn primary_tier_is_used_when_it_has_closes() {
        let provider = FakeProvider::default().with(
            "TCS.NS",
            Interval::FifteenMinutes,
            Reply::Bars(raw_bars(&[(1.0, 2.0, 0.5, 1.5)])),
        );
        let calls = provider.calls.clone();

        let fetched = fetcher(provider)
            .fetch(&Symbol::new("TCS.NS"), Interval::FifteenMinutes, Period::FiveDays)
            .await
            .unwrap();

        assert!(!fetched.used_fallback);
        assert_eq!(fetched.interval, Interval::FifteenMinutes);
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_intraday_falls_back_to_daily() {
        let provider = FakeProvider::default().with(
            "TCS.NS",
            Interval::OneDay,
            Reply::Bars(raw_bars(&[(1.0, 2.0, 0.5, 1.5)])),
        );
        let calls = provider.calls.clone();

        let fetched = fetcher(provider)
            .fetch(&Symbol::new("TCS.NS"), Interval::FifteenMinutes, Period::FiveDays)
            .await
            .unwrap();

        assert!(fetched.used_fallback);
        assert_eq!(fetched.interval, Interval::OneDay);
        let calls = calls.lock().unwrap();
        assert_eq!(calls[1].1, Interval::OneDay);
        assert_eq!(calls[1].2, Period::OneMonth);
    }

    #[tokio::test]
    async fn all_null_closes_count_as_empty() {
        let mut bars = raw_bars(&[(1.0, 2.0, 0.5, 1.5)]);
        bars[0].close = None;
        let provider = FakeProvider::default().with("X", Interval::OneHour, Reply::Bars(bars));
        let calls = provider.calls.clone();

        let err = fetcher(provider)
            .fetch(&Symbol::new("X"), Interval::OneHour, Period::FiveDays)
            .await
            .unwrap_err();

        assert_eq!(err, FetchError::Unavailable);
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn provider_error_also_tries_fallback() {
        let provider = FakeProvider::default()
            .with("X", Interval::ThirtyMinutes, Reply::Fail("boom".into()))
            .with("X", Interval::OneDay, Reply::Bars(raw_bars(&[(1.0, 2.0, 0.5, 1.5)])));

        let fetched = fetcher(provider)
            .fetch(&Symbol::new("X"), Interval::ThirtyMinutes, Period::FiveDays)
            .await
            .unwrap();
        assert!(fetched.used_fallback);
    }

    #[tokio::test]
    async fn fallback_tier_is_not_requested_twice() {
        let provider = FakeProvider::default();
        let calls = provider.calls.clone();

        let err = fetcher(provider)
            .fetch(&Symbol::new("X"), Interval::OneDay, Period::OneMonth)
            .await
            .unwrap_err();

        assert_eq!(err, FetchError::Unavailable);
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out_as_provider_failure() {
        let provider = FakeProvider::default()
            .with("X", Interval::OneDay, Reply::Hang(Duration::from_secs(60)));

        let err = fetcher(provider)
            .fetch(&Symbol::new("X"), Interval::OneDay, Period::OneMonth)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::ProviderFailure(msg) if msg.contains("timed out")));
    }
}
