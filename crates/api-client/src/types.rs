// In crates/api-client/src/types.rs

use serde::Deserialize;

/// Top-level body of the v8 chart endpoint.
#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartResult,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub result: Option<Vec<ChartData>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

/// One symbol's data. `timestamp` is absent when the range holds no bars.
#[derive(Debug, Deserialize)]
pub struct ChartData {
    pub timestamp: Option<Vec<i64>>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
pub struct ChartIndicators {
    pub quote: Vec<QuoteColumns>,
}

/// Column-oriented OHLCV; every cell may be `null`.
#[derive(Debug, Deserialize, Default)]
pub struct QuoteColumns {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

/// The subset of a Bot API reply we care about when a send is rejected.
#[derive(Debug, Deserialize)]
pub struct TelegramReply {
    pub ok: bool,
    pub description: Option<String>,
}
