// --- Pipeline event stream shared by the engine and its consumers ---

use chrono::{DateTime, Utc};
use core_types::{SignalKind, Symbol, Trend};
use serde::Serialize;

/// A log line forwarded from the tracing subscriber.
#[derive(Debug, Clone, Serialize)]
pub struct LogMessage {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub message: String,
}

/// One symbol's line in the cycle summary. Prices are already final; `None`
/// means the value is undefined and renders as "N/A".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalRow {
    pub symbol: Symbol,
    pub price: Option<f64>,
    pub breakout_level: Option<f64>,
    pub breakdown_level: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub sma: Option<f64>,
    pub kind: SignalKind,
    pub trend: Option<Trend>,
    /// "sent", "failed" or `None` when nothing was dispatched.
    pub alert: Option<String>,
    /// Why the symbol ended up `Unavailable`, if it did.
    pub error: Option<String>,
}

/// Everything a dashboard needs about one finished cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub rows: Vec<SignalRow>,
    pub warnings: Vec<String>,
}

/// The top-level event enum.
/// `tag` and `content` are used by serde for clean JSON representation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum PipelineEvent {
    Log(LogMessage),
    CycleCompleted(CycleSummary),
}

/// Formats an optional value with `digits` decimals, or "N/A".
pub fn fmt_opt(value: Option<f64>, digits: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.digits$}"),
        _ => "N/A".to_string(),
    }
}
