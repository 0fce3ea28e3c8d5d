// In crates/engine/src/pipeline.rs

use crate::cleaner::Cleaner;
use crate::dispatcher::{AlertDispatcher, AlertOutcome, AlertRecord};
use crate::error::SymbolError;
use crate::fetcher::DataFetcher;
use api_client::{MarketDataProvider, Notifier};
use app_config::RunConfig;
use chrono::{DateTime, Utc};
use core_types::{Interval, Period, SignalEvent, Series, Symbol};
use events::{CycleSummary, SignalRow};
use signals::{IndicatorEngine, IndicatorSet, SignalClassifier};
use tracing::{info, warn};

/// What one symbol produced in one cycle. Stages that never ran are `None`.
#[derive(Debug, Clone)]
pub struct SymbolOutcome {
    pub symbol: Symbol,
    pub series: Option<Series>,
    pub indicators: Option<IndicatorSet>,
    pub signal: SignalEvent,
    pub alert: Option<AlertRecord>,
    pub error: Option<SymbolError>,
    pub used_fallback: bool,
}

impl SymbolOutcome {
    fn failed(symbol: Symbol, error: SymbolError) -> Self {
        Self {
            signal: SignalEvent::unavailable(symbol.clone(), error.to_string()),
            symbol,
            series: None,
            indicators: None,
            alert: None,
            error: Some(error),
            used_fallback: false,
        }
    }

    fn row(&self) -> SignalRow {
        let s = &self.signal;
        SignalRow {
            symbol: self.symbol.clone(),
            price: s.price,
            breakout_level: s.levels.map(|l| l.breakout),
            breakdown_level: s.levels.map(|l| l.breakdown),
            rsi: s.snapshot.rsi,
            macd: s.snapshot.macd,
            macd_signal: s.snapshot.macd_signal,
            sma: s.snapshot.sma,
            kind: s.kind,
            trend: s.trend,
            alert: self.alert.as_ref().map(|a| match a.outcome {
                AlertOutcome::Sent => "sent".to_string(),
                AlertOutcome::Failed(_) => "failed".to_string(),
            }),
            error: s.reason.clone(),
        }
    }
}

/// The result of one cycle, in watch-list order. Replaced every cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<SymbolOutcome>,
    pub warnings: Vec<String>,
}

impl CycleReport {
    pub fn summary(&self) -> CycleSummary {
        CycleSummary {
            started_at: self.started_at,
            finished_at: self.finished_at,
            rows: self.outcomes.iter().map(SymbolOutcome::row).collect(),
            warnings: self.warnings.clone(),
        }
    }
}

/// Runs fetch → clean → indicators → classify → alert for each symbol.
pub struct Pipeline {
    symbols: Vec<Symbol>,
    interval: Interval,
    period: Period,
    fetcher: DataFetcher,
    cleaner: Cleaner,
    indicators: IndicatorEngine,
    classifier: SignalClassifier,
    dispatcher: AlertDispatcher,
}

impl Pipeline {
    pub fn new(
        config: &RunConfig,
        provider: Box<dyn MarketDataProvider>,
        notifier: Option<Box<dyn Notifier>>,
    ) -> Self {
        Self {
            symbols: config.symbols.clone(),
            interval: config.interval,
            period: config.period,
            fetcher: DataFetcher::new(provider, config.provider_timeout),
            cleaner: Cleaner::new(config.pipeline),
            indicators: IndicatorEngine::new(config.indicators.clone()),
            classifier: SignalClassifier::new(config.classifier.clone()),
            dispatcher: AlertDispatcher::new(
                notifier,
                config.enable_alerts,
                config.notify_timeout,
                config.currency_symbol.clone(),
            ),
        }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn dispatcher(&self) -> &AlertDispatcher {
        &self.dispatcher
    }

    /// One pass over the watch-list. Never fails: every per-symbol error ends
    /// up in that symbol's outcome.
    pub async fn run_cycle(&self) -> CycleReport {
        let started_at = Utc::now();
        let mut warnings = Vec::new();

        if self.symbols.is_empty() {
            warn!("The watch-list is empty. Nothing to scan.");
            warnings.push("watch-list is empty".to_string());
        }

        let mut outcomes = Vec::with_capacity(self.symbols.len());
        for symbol in &self.symbols {
            let outcome = self.process_symbol(symbol).await;
            if let Some(e) = &outcome.error {
                warn!(symbol = %symbol, error = %e, "Symbol unavailable this cycle.");
            }
            outcomes.push(outcome);
        }

        CycleReport {
            started_at,
            finished_at: Utc::now(),
            outcomes,
            warnings,
        }
    }

    async fn process_symbol(&self, symbol: &Symbol) -> SymbolOutcome {
        // --- 1. Fetch ---
        let fetched = match self.fetcher.fetch(symbol, self.interval, self.period).await {
            Ok(f) => f,
            Err(e) => return SymbolOutcome::failed(symbol.clone(), e.into()),
        };
        let used_fallback = fetched.used_fallback;

        // --- 2. Clean ---
        let series = match self.cleaner.clean(fetched) {
            Ok(s) => s,
            Err(e) => {
                let mut outcome = SymbolOutcome::failed(symbol.clone(), e.into());
                outcome.used_fallback = used_fallback;
                return outcome;
            }
        };

        // --- 3. Indicators ---
        let indicators = match self.indicators.compute(&series) {
            Ok(set) => set,
            Err(e) => {
                let mut outcome = SymbolOutcome::failed(symbol.clone(), e.into());
                outcome.series = Some(series);
                outcome.used_fallback = used_fallback;
                return outcome;
            }
        };

        // --- 4. Classify ---
        let signal = self.classifier.classify(&series, &indicators);
        info!(
            symbol = %symbol,
            kind = %signal.kind,
            price = ?signal.price,
            rsi = ?signal.snapshot.rsi,
            "Signal classified."
        );

        // --- 5. Alert ---
        let alert = self.dispatcher.dispatch(&signal).await;

        SymbolOutcome {
            symbol: symbol.clone(),
            series: Some(series),
            indicators: Some(indicators),
            signal,
            alert,
            error: None,
            used_fallback,
        }
    }
}
