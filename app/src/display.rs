// In app/src/display.rs

use chrono::Local;
use core_types::SignalKind;
use engine::{AlertOutcome, CycleReport, SymbolOutcome};
use events::fmt_opt;
use std::fmt::Write;

/// How much of each cycle to print.
#[derive(Debug, Clone)]
pub struct DisplayOptions {
    pub show_chart: bool,
    pub chart_rows: usize,
    pub currency: String,
}

/// Renders one cycle for the terminal.
pub fn render(report: &CycleReport, options: &DisplayOptions) -> String {
    let mut out = String::new();
    let stamp = report.finished_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S");
    let _ = writeln!(out, "Last Updated: {stamp}");

    for warning in &report.warnings {
        let _ = writeln!(out, "warning: {warning}");
    }

    for outcome in &report.outcomes {
        let _ = writeln!(out, "---");
        render_symbol(&mut out, outcome, options);
    }
    out
}

fn render_symbol(out: &mut String, outcome: &SymbolOutcome, options: &DisplayOptions) {
    let signal = &outcome.signal;
    let _ = write!(out, "{}", outcome.symbol);
    if outcome.used_fallback {
        let _ = write!(out, " (daily fallback)");
    }
    let _ = writeln!(out);

    if signal.kind == SignalKind::Unavailable && outcome.series.is_none() {
        let reason = signal.reason.as_deref().unwrap_or("data unavailable");
        let _ = writeln!(out, "  No valid data: {reason}");
        return;
    }

    let cur = &options.currency;
    let _ = writeln!(
        out,
        "  Price: {cur}{} | BO: {cur}{} | BD: {cur}{} | RSI: {} | MACD: {}",
        fmt_opt(signal.price, 2),
        fmt_opt(signal.levels.map(|l| l.breakout), 2),
        fmt_opt(signal.levels.map(|l| l.breakdown), 2),
        fmt_opt(signal.snapshot.rsi, 1),
        fmt_opt(signal.snapshot.macd, 2),
    );

    let label = match (signal.kind, signal.trend) {
        (kind, Some(trend)) if kind.is_channel_break() => format!("{kind} (trend: {})", SignalKind::from(trend)),
        (kind, _) => kind.to_string(),
    };
    let _ = writeln!(out, "  Signal: {label}");
    if let Some(reason) = &signal.reason {
        let _ = writeln!(out, "  Note: {reason}");
    }

    if let Some(alert) = &outcome.alert {
        let status = match &alert.outcome {
            AlertOutcome::Sent => "Telegram alert sent.".to_string(),
            AlertOutcome::Failed(e) => format!("Alert failed: {e}"),
        };
        let _ = writeln!(out, "  {status}");
    }

    if options.show_chart {
        if let Some(series) = &outcome.series {
            let bars = series.bars();
            let start = bars.len().saturating_sub(options.chart_rows);
            let _ = writeln!(
                out,
                "  {:<19} {:>10} {:>10} {:>10} {:>10}",
                "Time", "Open", "High", "Low", "Close"
            );
            for bar in &bars[start..] {
                let _ = writeln!(
                    out,
                    "  {:<19} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
                    bar.timestamp.format("%Y-%m-%d %H:%M"),
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use core_types::{
        Bar, ChannelLevels, IndicatorSnapshot, Interval, Series, SignalEvent, Symbol, Trend,
    };
    use engine::{AlertRecord, DispatchError};

    fn options(show_chart: bool) -> DisplayOptions {
        DisplayOptions {
            show_chart,
            chart_rows: 3,
            currency: "₹".into(),
        }
    }

    fn series(n: usize) -> Series {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let bars = (0..n)
            .map(|i| Bar {
                timestamp: base + Duration::days(i as i64),
                open: 10.0,
                high: 11.0,
                low: 9.0,
                close: 10.5,
                volume: 0.0,
            })
            .collect();
        Series::new(Symbol::new("INFY.NS"), Interval::OneDay, bars).unwrap()
    }

    fn report(outcomes: Vec<SymbolOutcome>) -> CycleReport {
        CycleReport {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            outcomes,
            warnings: vec![],
        }
    }

    fn breakout() -> SymbolOutcome {
        let symbol = Symbol::new("INFY.NS");
        SymbolOutcome {
            symbol: symbol.clone(),
            series: Some(series(5)),
            indicators: None,
            signal: SignalEvent {
                symbol: symbol.clone(),
                kind: SignalKind::Breakout,
                trend: Some(Trend::Hold),
                timestamp: None,
                price: Some(1510.0),
                levels: Some(ChannelLevels {
                    breakout: 1500.0,
                    breakdown: 1400.0,
                }),
                snapshot: IndicatorSnapshot {
                    rsi: Some(64.23),
                    macd: None,
                    macd_signal: None,
                    sma: Some(1450.0),
                },
                reason: None,
            },
            alert: Some(AlertRecord {
                symbol,
                message: String::new(),
                outcome: AlertOutcome::Failed(DispatchError::NonSuccessStatus(401)),
                attempted_at: Utc::now(),
            }),
            error: None,
            used_fallback: true,
        }
    }

    #[test]
    fn symbol_line_shows_levels_and_na() {
        let text = render(&report(vec![breakout()]), &options(false));
        assert!(text.starts_with("Last Updated: "));
        assert!(text.contains("INFY.NS (daily fallback)"));
        assert!(text.contains("Price: ₹1510.00 | BO: ₹1500.00 | BD: ₹1400.00 | RSI: 64.2 | MACD: N/A"));
        assert!(text.contains("Signal: Breakout (trend: Hold)"));
        assert!(text.contains("Alert failed: notification rejected with HTTP status 401"));
        assert!(!text.contains("Open"));
    }

    #[test]
    fn chart_shows_only_the_latest_rows() {
        let text = render(&report(vec![breakout()]), &options(true));
        assert!(text.contains("Open"));
        assert!(!text.contains("2024-05-02"));
        assert!(text.contains("2024-05-03 00:00"));
        assert!(text.contains("2024-05-05 00:00"));
    }

    #[test]
    fn unavailable_symbol_shows_reason() {
        let symbol = Symbol::new("BAD.NS");
        let outcome = SymbolOutcome {
            symbol: symbol.clone(),
            series: None,
            indicators: None,
            signal: SignalEvent::unavailable(symbol, "data unavailable: provider failure: boom"),
            alert: None,
            error: None,
            used_fallback: false,
        };
        let text = render(&report(vec![outcome]), &options(true));
        assert!(text.contains("No valid data: data unavailable: provider failure: boom"));
    }
}
