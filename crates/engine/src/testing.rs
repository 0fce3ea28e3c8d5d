// In crates/engine/src/testing.rs
//
// In-memory stand-ins for the provider and the notifier.

use api_client::{Error as ApiError, MarketDataProvider, Notifier, Result as ApiResult};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use core_types::{Interval, Period, RawBar, Symbol};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub type Calls = Arc<Mutex<Vec<(Symbol, Interval, Period)>>>;

/// What the fake provider answers for one (symbol, interval) pair.
#[derive(Clone)]
pub enum Reply {
    Bars(Vec<RawBar>),
    Fail(String),
    Hang(Duration),
}

/// Answers from a table; anything not in the table gets an empty response.
#[derive(Default)]
pub struct FakeProvider {
    replies: HashMap<(String, Interval), Reply>,
    pub calls: Calls,
}

impl FakeProvider {
    pub fn with(mut self, symbol: &str, interval: Interval, reply: Reply) -> Self {
        self.replies.insert((symbol.to_string(), interval), reply);
        self
    }
}

#[async_trait]
impl MarketDataProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn fetch(
        &self,
        symbol: &Symbol,
        interval: Interval,
        period: Period,
    ) -> ApiResult<Vec<RawBar>> {
        self.calls
            .lock()
            .unwrap()
            .push((symbol.clone(), interval, period));

        match self.replies.get(&(symbol.to_string(), interval)).cloned() {
            Some(Reply::Bars(bars)) => Ok(bars),
            Some(Reply::Fail(msg)) => Err(ApiError::MalformedResponse(msg)),
            Some(Reply::Hang(d)) => {
                tokio::time::sleep(d).await;
                Ok(Vec::new())
            }
            None => Ok(Vec::new()),
        }
    }
}

/// Records every message; optionally stalls, drops or rejects them.
#[derive(Default)]
pub struct FakeNotifier {
    pub sent: Arc<Mutex<Vec<String>>>,
    pub reject_with: Option<u16>,
    /// Fails below the HTTP layer, as a dropped connection would.
    pub drop_with: Option<String>,
    pub hang: Option<Duration>,
}

#[async_trait]
impl Notifier for FakeNotifier {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn send(&self, text: &str) -> ApiResult<()> {
        self.sent.lock().unwrap().push(text.to_string());
        if let Some(d) = self.hang {
            tokio::time::sleep(d).await;
        }
        if let Some(msg) = &self.drop_with {
            return Err(ApiError::MalformedResponse(msg.clone()));
        }
        match self.reject_with {
            Some(status) => Err(ApiError::HttpStatus {
                status,
                body: "rejected".into(),
            }),
            None => Ok(()),
        }
    }
}

/// Daily raw bars with every field present.
pub fn raw_bars(ohlc: &[(f64, f64, f64, f64)]) -> Vec<RawBar> {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    ohlc.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| RawBar {
            timestamp: base + ChronoDuration::days(i as i64),
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume: Some(1000.0),
        })
        .collect()
}

/// 30 bars ranging between 98 and 102, then a bar closing at `latest_close`.
pub fn ranging_then(latest_close: f64) -> Vec<RawBar> {
    let mut ohlc: Vec<_> = (0..30)
        .map(|i| {
            let close = if i % 2 == 0 { 99.0 } else { 101.0 };
            (100.0, close + 1.0, close - 1.0, close)
        })
        .collect();
    ohlc.push((
        101.0,
        latest_close.max(101.0) + 1.0,
        latest_close.min(101.0) - 1.0,
        latest_close,
    ));
    raw_bars(&ohlc)
}
