// In crates/signals/src/classifier.rs

use crate::indicators::IndicatorSet;
use crate::types::ClassifierSettings;
use core_types::{Bar, ChannelLevels, SignalEvent, SignalKind, Series, Trend};

/// Turns a series and its indicators into one [`SignalEvent`] for the latest bar.
///
/// Two rule families are evaluated independently:
/// 1. Channel: the latest close against the extremes of the preceding bars.
/// 2. Oscillator-trend: RSI extremes confirmed by the close's side of the SMA.
///
/// A channel break takes the event's `kind` because it is what gets alerted on;
/// the Buy/Sell/Hold tag is always attached for display.
#[derive(Debug, Clone, Default)]
pub struct SignalClassifier {
    settings: ClassifierSettings,
}

impl SignalClassifier {
    pub fn new(settings: ClassifierSettings) -> Self {
        Self { settings }
    }

    pub fn classify(&self, series: &Series, indicators: &IndicatorSet) -> SignalEvent {
        let symbol = series.symbol().clone();

        let Some(latest) = series.latest() else {
            return SignalEvent::unavailable(symbol, "series is empty");
        };
        if indicators.len() != series.len() {
            return SignalEvent::unavailable(symbol, "indicators are not aligned with the series");
        }

        let snapshot = indicators.latest();
        let levels = channel_levels(series.bars(), self.settings.channel_length);

        let mut event = SignalEvent {
            symbol,
            kind: SignalKind::Unavailable,
            trend: None,
            timestamp: Some(latest.timestamp),
            price: Some(latest.close),
            levels,
            snapshot,
            reason: None,
        };

        // --- Warm-up guard: never guess on undefined indicators ---
        let (Some(rsi), Some(sma)) = (snapshot.rsi, snapshot.sma) else {
            event.reason = Some("indicators are still warming up".to_string());
            return event;
        };
        let Some(levels) = levels else {
            event.reason = Some("not enough bars to form the breakout channel".to_string());
            return event;
        };

        let trend = self.trend(rsi, latest.close, sma);
        let channel = if latest.close > levels.breakout {
            Some(SignalKind::Breakout)
        } else if latest.close < levels.breakdown {
            Some(SignalKind::Breakdown)
        } else {
            None
        };

        event.trend = Some(trend);
        event.kind = channel.unwrap_or_else(|| trend.into());
        event
    }

    /// Buy when oversold with price support, Sell when overbought with price
    /// weakness, otherwise Hold.
    pub fn trend(&self, rsi: f64, close: f64, sma: f64) -> Trend {
        if rsi < self.settings.rsi_oversold && close > sma {
            Trend::Buy
        } else if rsi > self.settings.rsi_overbought && close < sma {
            Trend::Sell
        } else {
            Trend::Hold
        }
    }
}

/// The highest high and lowest low of the `length` bars before the latest one.
///
/// The latest bar is excluded from its own window; otherwise its close could
/// never exceed a maximum that already contains its high.
pub fn channel_levels(bars: &[Bar], length: usize) -> Option<ChannelLevels> {
    if length == 0 || bars.len() < length + 1 {
        return None;
    }

    let window = &bars[bars.len() - 1 - length..bars.len() - 1];
    let breakout = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let breakdown = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

    Some(ChannelLevels {
        breakout,
        breakdown,
    })
}
