// In crates/engine/src/lib.rs

pub mod cleaner;
pub mod dispatcher;
pub mod error;
pub mod fetcher;
pub mod pipeline;

#[cfg(test)]
mod testing;

use anyhow::Result;
use events::PipelineEvent;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::time::MissedTickBehavior;

pub use dispatcher::{AlertDispatcher, AlertOutcome, AlertRecord};
pub use error::{DispatchError, FetchError, SymbolError, ValidationError};
pub use pipeline::{CycleReport, Pipeline, SymbolOutcome};

/// The polling orchestrator: runs one pipeline cycle per tick and publishes
/// each report on the event channel.
pub struct Engine {
    pipeline: Pipeline,
    refresh: Duration,
    events_tx: broadcast::Sender<PipelineEvent>,
}

impl Engine {
    pub fn new(
        pipeline: Pipeline,
        refresh: Duration,
        events_tx: broadcast::Sender<PipelineEvent>,
    ) -> Self {
        Self {
            pipeline,
            refresh,
            events_tx,
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Runs a single cycle and publishes its summary.
    pub async fn run_once(&self) -> CycleReport {
        let report = self.pipeline.run_cycle().await;
        tracing::info!(
            symbols = report.outcomes.len(),
            warnings = report.warnings.len(),
            "Cycle complete."
        );
        // No subscribers is not an error.
        let _ = self
            .events_tx
            .send(PipelineEvent::CycleCompleted(report.summary()));
        report
    }

    /// The main run method for the orchestrator.
    ///
    /// Cycles start on every tick of the refresh interval (the first one
    /// immediately) and never overlap. `shutdown` is only looked at between
    /// cycles, so a cycle in flight always finishes. Only a `true` on
    /// `shutdown` stops the loop; a dropped sender does not. `on_cycle` sees
    /// every report before the loop waits again.
    pub async fn run<F>(&self, mut shutdown: watch::Receiver<bool>, mut on_cycle: F) -> Result<()>
    where
        F: FnMut(&CycleReport),
    {
        tracing::info!(
            symbols = self.pipeline.symbols().len(),
            refresh_secs = self.refresh.as_secs(),
            "Starting the polling loop..."
        );

        let mut ticker = tokio::time::interval(self.refresh);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut cycles: u64 = 0;
        let mut watching = true;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed(), if watching => {
                    // A dropped sender can no longer ask us to stop; keep polling.
                    if changed.is_err() {
                        tracing::warn!("Shutdown signal source went away; polling continues.");
                        watching = false;
                    } else if *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }
            if *shutdown.borrow() {
                break;
            }

            let report = self.run_once().await;
            cycles += 1;
            on_cycle(&report);
        }

        tracing::info!(cycles, "Polling loop stopped.");
        Ok(())
    }
}
