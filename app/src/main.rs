// In app/src/main.rs

use anyhow::{Context, Result};
use api_client::{Notifier, TelegramClient, YahooClient};
use app_config::{RunConfig, Settings};
use clap::{Args, Parser, Subcommand};
use engine::{Engine, Pipeline};
use events::PipelineEvent;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;

mod display;
mod tracing_layer;

use crate::display::DisplayOptions;
use crate::tracing_layer::EventBroadcastLayer;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "Polls market data and flags breakouts, breakdowns and RSI/SMA trend signals.")]
struct Cli {
    /// Directory holding base.toml and the per-environment overrides.
    #[arg(long, global = true, default_value = "config")]
    config_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs the polling loop until Ctrl+C.
    Run {
        #[command(flatten)]
        overrides: Overrides,

        /// Print the event stream as newline-delimited JSON instead of the table.
        #[arg(long)]
        json: bool,
    },

    /// Runs a single cycle and exits.
    Scan {
        #[command(flatten)]
        overrides: Overrides,

        #[arg(long)]
        json: bool,
    },

    /// Sends a test message to check the Telegram credentials.
    CheckAlerts,
}

/// Command-line values that win over the configuration files.
#[derive(Args, Debug, Default)]
struct Overrides {
    /// Comma-separated tickers (e.g., "RELIANCE.NS,TCS.NS").
    #[arg(short, long)]
    symbols: Option<String>,

    /// One of 15m, 30m, 1h, 1d.
    #[arg(short, long)]
    interval: Option<String>,

    /// Minutes between cycles.
    #[arg(long)]
    refresh_minutes: Option<u64>,

    /// Send Telegram alerts on breakouts and breakdowns.
    #[arg(long)]
    alerts: bool,

    /// Skip the OHLC table.
    #[arg(long)]
    no_chart: bool,
}

impl Overrides {
    fn apply(self, settings: &mut Settings) {
        if let Some(symbols) = self.symbols {
            settings.watchlist.symbols = symbols;
        }
        if let Some(interval) = self.interval {
            settings.watchlist.interval = interval;
        }
        if let Some(minutes) = self.refresh_minutes {
            settings.watchlist.refresh_minutes = minutes;
        }
        if self.alerts {
            settings.watchlist.enable_alerts = true;
        }
        if self.no_chart {
            settings.watchlist.show_chart = false;
        }
    }
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    // Parse command-line arguments.
    let cli = Cli::parse();
    let mut settings = app_config::load_settings_from(&cli.config_dir)
        .with_context(|| format!("failed to load settings from '{}'", cli.config_dir))?;

    // --- Event Channel and Tracing Setup ---
    let (events_tx, _) = broadcast::channel::<PipelineEvent>(1024);
    init_tracing(&settings, events_tx.clone());

    tracing::info!(environment = %settings.app.environment, "Starting Pulse");

    // Match on the parsed command and call the appropriate handler.
    match cli.command {
        Commands::Run { overrides, json } => {
            overrides.apply(&mut settings);
            handle_run(&settings, events_tx, json, false).await?;
        }
        Commands::Scan { overrides, json } => {
            overrides.apply(&mut settings);
            handle_run(&settings, events_tx, json, true).await?;
        }
        Commands::CheckAlerts => {
            handle_check_alerts(&settings).await?;
        }
    }

    tracing::info!("Pulse has finished successfully.");

    Ok(())
}

fn init_tracing(settings: &Settings, events_tx: broadcast::Sender<PipelineEvent>) {
    let level = tracing::Level::from_str(&settings.app.log_level).unwrap_or(tracing::Level::INFO);
    let targets = Targets::new()
        .with_target("reqwest", tracing::Level::WARN)
        .with_target("hyper", tracing::Level::WARN)
        .with_default(level);

    // stdout carries the cycle output, so human logs go to stderr.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(targets.clone());
    let event_layer = EventBroadcastLayer::new(events_tx).with_filter(targets);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(event_layer)
        .init();
}

fn build_notifier(settings: &Settings, config: &RunConfig) -> Result<Option<Box<dyn Notifier>>> {
    let Some(credentials) = config.telegram.clone() else {
        return Ok(None);
    };
    let client = TelegramClient::new(&settings.telegram.base_url, credentials, config.notify_timeout)?;
    Ok(Some(Box::new(client)))
}

// --- "Run" / "Scan" Subcommand Logic ---

async fn handle_run(
    settings: &Settings,
    events_tx: broadcast::Sender<PipelineEvent>,
    json: bool,
    single_cycle: bool,
) -> Result<()> {
    // --- 1. Initialization ---
    let config = RunConfig::from_settings(settings)?;
    let provider = YahooClient::new(&settings.provider)?;
    let notifier = build_notifier(settings, &config)?;
    let pipeline = Pipeline::new(&config, Box::new(provider), notifier);
    let engine = Engine::new(pipeline, config.refresh, events_tx.clone());

    let options = DisplayOptions {
        show_chart: config.show_chart,
        chart_rows: settings.display.chart_rows,
        currency: config.currency_symbol.clone(),
    };

    // --- 2. Event stream printer (JSON mode) ---
    let printer = json.then(|| {
        let mut rx = events_tx.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => match serde_json::to_string(&event) {
                        Ok(line) => println!("{line}"),
                        Err(e) => eprintln!("failed to serialize event: {e}"),
                    },
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        eprintln!("event stream lagged, {skipped} events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    });

    let on_cycle = |report: &engine::CycleReport| {
        if !json {
            print!("{}", display::render(report, &options));
        }
    };

    // --- 3. Run ---
    if single_cycle {
        let report = engine.run_once().await;
        on_cycle(&report);
    } else {
        let (stop_tx, stop_rx) = watch::channel(false);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Shutdown requested. Finishing the current cycle...");
                    let _ = stop_tx.send(true);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Could not listen for Ctrl-C; stop the process externally.");
                    // Holding the sender keeps the loop from reading this as a stop.
                    let _stop_tx = stop_tx;
                    std::future::pending::<()>().await;
                }
            }
        });
        engine.run(stop_rx, on_cycle).await?;
    }

    // Give the printer a moment to flush what is already queued.
    if let Some(printer) = printer {
        tokio::time::timeout(Duration::from_secs(1), printer).await.ok();
    }

    Ok(())
}

// --- "CheckAlerts" Subcommand Logic ---

async fn handle_check_alerts(settings: &Settings) -> Result<()> {
    let config = RunConfig::from_settings(settings)?;
    let notifier = build_notifier(settings, &config)?;
    let dispatcher = engine::AlertDispatcher::new(
        notifier,
        true,
        config.notify_timeout,
        config.currency_symbol.clone(),
    );

    dispatcher
        .send_test("✅ Pulse test alert. Telegram notifications are working.")
        .await
        .context("test alert was not delivered")?;

    tracing::info!("Test alert sent.");
    Ok(())
}
