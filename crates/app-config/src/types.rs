// In crates/app-config/src/types.rs

use core_types::{Interval, Period, Symbol};
use serde::Deserialize;
use signals::types::{ClassifierSettings, IndicatorSettings};
use std::time::Duration;

use crate::{Error, Result};

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    #[serde(default)]
    pub app: AppSettings,
    /// The instruments to watch and how often to look at them.
    pub watchlist: WatchlistSettings,
    /// Settings for the market-data provider.
    #[serde(default)]
    pub provider: ProviderSettings,
    /// Settings for the Telegram notification channel.
    #[serde(default)]
    pub telegram: TelegramSettings,
    /// Data-sufficiency gates applied by the cleaner.
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub indicators: IndicatorSettings,
    #[serde(default)]
    pub classifier: ClassifierSettings,
    #[serde(default)]
    pub display: DisplaySettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    #[serde(default = "default_environment")]
    pub environment: String,
    /// The log level for the application.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct WatchlistSettings {
    /// Comma-separated tickers, e.g. "RELIANCE.NS, TCS.NS".
    #[serde(default)]
    pub symbols: String,
    /// One of "15m", "30m", "1h", "1d".
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default = "default_true")]
    pub show_chart: bool,
    #[serde(default)]
    pub enable_alerts: bool,
    /// Minutes between polling cycles.
    #[serde(default = "default_refresh_minutes")]
    pub refresh_minutes: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ProviderSettings {
    /// The base URL of the chart API.
    #[serde(default = "default_provider_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: default_provider_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct TelegramSettings {
    /// The Bot API base URL.
    #[serde(default = "default_telegram_url")]
    pub base_url: String,
    /// Usually supplied through `APP_TELEGRAM__BOT_TOKEN`.
    #[serde(default)]
    pub bot_token: Option<String>,
    /// Usually supplied through `APP_TELEGRAM__CHAT_ID`.
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            base_url: default_telegram_url(),
            bot_token: None,
            chat_id: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TelegramSettings {
    /// Both credentials, if both are present and non-blank.
    pub fn credentials(&self) -> Option<TelegramCredentials> {
        let token = self.bot_token.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let chat_id = self.chat_id.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some(TelegramCredentials {
            bot_token: token.to_string(),
            chat_id: chat_id.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramCredentials {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Fewer cleaned bars than this and the symbol is reported as insufficient data.
    #[serde(default = "default_min_bars")]
    pub min_bars: usize,
    /// Fewer non-missing closes than this and the symbol is reported as insufficient data.
    #[serde(default = "default_min_closes")]
    pub min_closes: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            min_bars: default_min_bars(),
            min_closes: default_min_closes(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct DisplaySettings {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    /// How many of the latest bars the console chart shows.
    #[serde(default = "default_chart_rows")]
    pub chart_rows: usize,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            chart_rows: default_chart_rows(),
        }
    }
}

// --- The immutable per-run configuration ---

/// Everything one run of the pipeline needs, parsed and validated once.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub symbols: Vec<Symbol>,
    pub interval: Interval,
    pub period: Period,
    pub show_chart: bool,
    pub enable_alerts: bool,
    pub refresh: Duration,
    pub provider_timeout: Duration,
    pub notify_timeout: Duration,
    pub pipeline: PipelineSettings,
    pub indicators: IndicatorSettings,
    pub classifier: ClassifierSettings,
    pub currency_symbol: String,
    /// `None` when either credential is absent, which disables alerting.
    pub telegram: Option<TelegramCredentials>,
}

impl RunConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let interval: Interval =
            settings
                .watchlist
                .interval
                .parse()
                .map_err(|e: core_types::Error| Error::InvalidSetting {
                    key: "watchlist.interval",
                    reason: e.to_string(),
                })?;

        if settings.watchlist.refresh_minutes == 0 {
            return Err(Error::InvalidSetting {
                key: "watchlist.refresh_minutes",
                reason: "must be at least 1".to_string(),
            });
        }
        let refresh_secs = settings
            .watchlist
            .refresh_minutes
            .checked_mul(60)
            .ok_or_else(|| Error::InvalidSetting {
                key: "watchlist.refresh_minutes",
                reason: format!("{} minutes is out of range", settings.watchlist.refresh_minutes),
            })?;

        let provider_timeout = positive_secs("provider.timeout_secs", settings.provider.timeout_secs)?;
        let notify_timeout = positive_secs("telegram.timeout_secs", settings.telegram.timeout_secs)?;

        // Faults here would otherwise fail every symbol on every cycle.
        settings.indicators.validate().map_err(|e| Error::InvalidSetting {
            key: "indicators",
            reason: e.to_string(),
        })?;
        settings.classifier.validate().map_err(|e| Error::InvalidSetting {
            key: "classifier",
            reason: e.to_string(),
        })?;

        Ok(Self {
            symbols: crate::parse_symbol_list(&settings.watchlist.symbols),
            interval,
            period: interval.default_period(),
            show_chart: settings.watchlist.show_chart,
            enable_alerts: settings.watchlist.enable_alerts,
            refresh: Duration::from_secs(refresh_secs),
            provider_timeout,
            notify_timeout,
            pipeline: settings.pipeline,
            indicators: settings.indicators.clone(),
            classifier: settings.classifier.clone(),
            currency_symbol: settings.display.currency_symbol.clone(),
            telegram: settings.telegram.credentials(),
        })
    }
}

fn positive_secs(key: &'static str, secs: u64) -> Result<Duration> {
    if secs == 0 {
        return Err(Error::InvalidSetting {
            key,
            reason: "must be at least 1 second".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

/// Helper functions for serde defaults
fn default_environment() -> String { "development".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_interval() -> String { "1d".to_string() }
fn default_true() -> bool { true }
fn default_refresh_minutes() -> u64 { 1 }
fn default_provider_url() -> String { "https://query2.finance.yahoo.com".to_string() }
fn default_telegram_url() -> String { "https://api.telegram.org".to_string() }
fn default_timeout_secs() -> u64 { 10 }
fn default_user_agent() -> String { "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36".to_string() }
fn default_min_bars() -> usize { 30 }
fn default_min_closes() -> usize { 5 }
fn default_currency_symbol() -> String { "₹".to_string() }
fn default_chart_rows() -> usize { 10 }
