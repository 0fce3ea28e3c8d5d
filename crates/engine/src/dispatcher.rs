// In crates/engine/src/dispatcher.rs

use crate::error::DispatchError;
use api_client::{Error as ApiError, Notifier};
use chrono::{DateTime, Utc};
use core_types::{SignalEvent, SignalKind, Symbol};
use events::fmt_opt;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum AlertOutcome {
    Sent,
    Failed(DispatchError),
}

/// One attempted notification. Lives only as long as the cycle report.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRecord {
    pub symbol: Symbol,
    pub message: String,
    pub outcome: AlertOutcome,
    pub attempted_at: DateTime<Utc>,
}

impl AlertRecord {
    pub fn is_sent(&self) -> bool {
        self.outcome == AlertOutcome::Sent
    }
}

/// Sends channel-break alerts through a [`Notifier`].
pub struct AlertDispatcher {
    notifier: Option<Box<dyn Notifier>>,
    enabled: bool,
    timeout: Duration,
    currency: String,
}

impl AlertDispatcher {
    /// `notifier` is `None` when credentials are missing; that is reported
    /// here, once, instead of on every cycle.
    pub fn new(
        notifier: Option<Box<dyn Notifier>>,
        enabled: bool,
        timeout: Duration,
        currency: impl Into<String>,
    ) -> Self {
        if enabled && notifier.is_none() {
            warn!("Alerts are enabled but Telegram credentials are not set. Alerts are disabled.");
        }
        Self {
            notifier,
            enabled,
            timeout,
            currency: currency.into(),
        }
    }

    /// Whether a breakout would actually be sent.
    pub fn is_active(&self) -> bool {
        self.enabled && self.notifier.is_some()
    }

    /// Sends an alert for a channel break. Returns `None` when nothing was attempted.
    pub async fn dispatch(&self, event: &SignalEvent) -> Option<AlertRecord> {
        if !self.enabled {
            return None;
        }
        let message = format_alert(event, &self.currency)?;
        let notifier = self.notifier.as_ref()?;

        let attempted_at = Utc::now();
        let outcome = match self.send_with(&**notifier, &message).await {
            Ok(()) => {
                info!(symbol = %event.symbol, kind = %event.kind, "Telegram alert sent.");
                AlertOutcome::Sent
            }
            Err(e) => {
                warn!(symbol = %event.symbol, error = %e, "Alert failed.");
                AlertOutcome::Failed(e)
            }
        };

        Some(AlertRecord {
            symbol: event.symbol.clone(),
            message,
            outcome,
            attempted_at,
        })
    }

    /// Sends a fixed message to check that the credentials work.
    pub async fn send_test(&self, text: &str) -> Result<(), DispatchError> {
        let notifier = self.notifier.as_ref().ok_or(DispatchError::CredentialsMissing)?;
        self.send_with(&**notifier, text).await
    }

    async fn send_with(&self, notifier: &dyn Notifier, text: &str) -> Result<(), DispatchError> {
        match tokio::time::timeout(self.timeout, notifier.send(text)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(ApiError::HttpStatus { status, .. })) => Err(DispatchError::NonSuccessStatus(status)),
            Ok(Err(e)) => Err(DispatchError::TransportFailure(e.to_string())),
            Err(_) => Err(DispatchError::TransportFailure(format!(
                "timed out after {:?}",
                self.timeout
            ))),
        }
    }
}

/// The alert text for a channel break, or `None` for any other signal.
pub fn format_alert(event: &SignalEvent, currency: &str) -> Option<String> {
    let (icon, label, cmp, stats_icon) = match event.kind {
        SignalKind::Breakout => ("🚀", "Breakout", ">", "📊"),
        SignalKind::Breakdown => ("⚠️", "Breakdown", "<", "📉"),
        _ => return None,
    };
    let level = event.triggering_level()?;

    Some(format!(
        "{icon} *{symbol} {label}!*\nPrice: {currency}{price} {cmp} {currency}{level}\n{stats_icon} RSI: {rsi} | MACD: {macd}",
        symbol = event.symbol,
        price = fmt_opt(event.price, 2),
        level = fmt_opt(Some(level), 2),
        rsi = fmt_opt(event.snapshot.rsi, 1),
        macd = fmt_opt(event.snapshot.macd, 2),
    ))
}
