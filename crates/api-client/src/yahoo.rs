// In crates/api-client/src/yahoo.rs

use crate::types::ChartResponse;
use crate::{Error, MarketDataProvider, Result};
use app_config::types::ProviderSettings;
use async_trait::async_trait;
use chrono::DateTime;
use core_types::{Interval, Period, RawBar, Symbol};
use reqwest::Url;
use std::time::Duration;
use tracing::debug;

/// Market data from the public v8 chart endpoint.
pub struct YahooClient {
    http_client: reqwest::Client,
    base_url: Url,
}

impl YahooClient {
    /// Constructs a new YahooClient from ProviderSettings.
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(|e| Error::ClientBuildError(e.to_string()))?;

        let base_url = Url::parse(&settings.base_url).map_err(|e| {
            Error::ClientBuildError(format!("invalid base URL {}: {e}", settings.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::ClientBuildError(format!(
                "base URL {} cannot carry a path",
                settings.base_url
            )));
        }

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Build the chart API URL for a symbol, interval and range.
    ///
    /// The symbol is a single percent-encoded path segment, so characters
    /// such as `#`, `?` or `/` cannot change the shape of the request.
    pub fn chart_url(&self, symbol: &Symbol, interval: Interval, period: Period) -> Url {
        // The endpoint spells the hourly interval "60m".
        let interval = match interval {
            Interval::OneHour => "60m",
            other => other.as_str(),
        };

        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v8", "finance", "chart", symbol.as_str()]);
        }
        url.query_pairs_mut()
            .clear()
            .append_pair("interval", interval)
            .append_pair("range", period.as_str());
        url
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    fn name(&self) -> &'static str {
        "yahoo_finance"
    }

    async fn fetch(
        &self,
        symbol: &Symbol,
        interval: Interval,
        period: Period,
    ) -> Result<Vec<RawBar>> {
        let url = self.chart_url(symbol, interval, period);
        debug!(%url, "Requesting chart data.");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(Error::RequestFailed)?;

        let status = response.status();
        let text = response.text().await.map_err(Error::RequestFailed)?;

        // Unknown symbols come back as 404 with a regular chart error body, so
        // try the body before giving up on the status.
        match serde_json::from_str::<ChartResponse>(&text) {
            Ok(body) => parse_chart(symbol, body),
            Err(_) if !status.is_success() => Err(Error::HttpStatus {
                status: status.as_u16(),
                body: text,
            }),
            Err(e) => Err(Error::DeserializationFailed(e)),
        }
    }
}

/// Turns a chart body into raw bars.
///
/// A response with no timestamps is an empty range, not an error. Cells stay
/// `None` when the provider sent `null`; rows that are entirely empty are
/// skipped.
pub fn parse_chart(symbol: &Symbol, response: ChartResponse) -> Result<Vec<RawBar>> {
    if let Some(err) = response.chart.error {
        if err.code == "Not Found" {
            return Err(Error::SymbolNotFound(symbol.to_string()));
        }
        return Err(Error::ApiError {
            code: err.code,
            msg: err.description,
        });
    }

    let Some(data) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Err(Error::MalformedResponse("result array is empty".into()));
    };

    let Some(timestamps) = data.timestamp else {
        return Ok(Vec::new());
    };

    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let timestamp = DateTime::from_timestamp(ts, 0)
            .ok_or_else(|| Error::MalformedResponse(format!("invalid timestamp: {ts}")))?;

        let cell = |column: &[Option<f64>]| column.get(i).copied().flatten();
        let bar = RawBar {
            timestamp,
            open: cell(&quote.open),
            high: cell(&quote.high),
            low: cell(&quote.low),
            close: cell(&quote.close),
            volume: cell(&quote.volume),
        };

        if bar.open.is_none()
            && bar.high.is_none()
            && bar.low.is_none()
            && bar.close.is_none()
            && bar.volume.is_none()
        {
            continue;
        }
        bars.push(bar);
    }

    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Vec<RawBar>> {
        let body: ChartResponse = serde_json::from_str(json).unwrap();
        parse_chart(&Symbol::new("TCS.NS"), body)
    }

    #[test]
    fn parses_columns_and_keeps_null_cells() {
        let bars = parse(
            r#"{"chart":{"result":[{
                "timestamp":[1700000000,1700086400,1700172800],
                "indicators":{"quote":[{
                    "open":[10.0,null,12.0],
                    "high":[11.0,null,13.0],
                    "low":[9.5,null,11.5],
                    "close":[10.5,null,null],
                    "volume":[1000,null,null]
                }]}
            }],"error":null}}"#,
        )
        .unwrap();

        // The all-null middle row is dropped; the partial last row survives.
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, Some(10.5));
        assert_eq!(bars[0].volume, Some(1000.0));
        assert_eq!(bars[1].open, Some(12.0));
        assert_eq!(bars[1].close, None);
        assert_eq!(bars[1].timestamp.timestamp(), 1700172800);
    }

    #[test]
    fn missing_timestamps_mean_empty_range() {
        let bars = parse(
            r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#,
        )
        .unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn not_found_error_maps_to_symbol_not_found() {
        let err = parse(
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::SymbolNotFound(s) if s == "TCS.NS"));
    }

    #[test]
    fn other_errors_keep_code_and_description() {
        let err = parse(
            r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input"}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::ApiError { code, .. } if code == "Bad Request"));
    }

    #[test]
    fn chart_url_uses_interval_and_range() {
        let client = YahooClient::new(&ProviderSettings {
            base_url: "https://example.test/".into(),
            ..ProviderSettings::default()
        })
        .unwrap();

        assert_eq!(
            client
                .chart_url(&Symbol::new("infy.ns"), Interval::FifteenMinutes, Period::FiveDays)
                .as_str(),
            "https://example.test/v8/finance/chart/INFY.NS?interval=15m&range=5d"
        );
        assert_eq!(
            client
                .chart_url(&Symbol::new("INFY.NS"), Interval::OneHour, Period::OneMonth)
                .as_str(),
            "https://example.test/v8/finance/chart/INFY.NS?interval=60m&range=1mo"
        );
    }

    #[test]
    fn chart_url_escapes_symbol_characters() {
        let client = YahooClient::new(&ProviderSettings {
            base_url: "https://example.test".into(),
            ..ProviderSettings::default()
        })
        .unwrap();

        let url = client.chart_url(&Symbol::new("a#b?c/d"), Interval::OneDay, Period::OneMonth);
        assert_eq!(
            url.as_str(),
            "https://example.test/v8/finance/chart/A%23B%3FC%2FD?interval=1d&range=1mo"
        );
        assert_eq!(url.path_segments().unwrap().count(), 4);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn unparseable_base_url_is_a_build_error() {
        let result = YahooClient::new(&ProviderSettings {
            base_url: "not a url".into(),
            ..ProviderSettings::default()
        });
        assert!(matches!(result, Err(Error::ClientBuildError(_))));
    }
}
