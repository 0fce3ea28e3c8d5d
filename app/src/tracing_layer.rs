// In app/src/tracing_layer.rs

use chrono::Utc;
use events::{LogMessage, PipelineEvent};
use std::fmt::Write;
use tokio::sync::broadcast;
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;

/// Forwards every log event onto the pipeline event channel, so a consumer
/// of the stream sees logs and cycle results interleaved in order.
pub struct EventBroadcastLayer {
    tx: broadcast::Sender<PipelineEvent>,
}

impl EventBroadcastLayer {
    pub fn new(tx: broadcast::Sender<PipelineEvent>) -> Self {
        Self { tx }
    }
}

impl<S> Layer<S> for EventBroadcastLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        // Create a visitor to extract the message from the event's fields.
        let mut visitor = LogMessageVisitor::default();
        event.record(&mut visitor);
        let log_message = LogMessage {
            timestamp: Utc::now(),
            level: event.metadata().level().to_string(),
            message: visitor.finish(),
        };
        // No receivers just means nobody is listening yet.
        let _ = self.tx.send(PipelineEvent::Log(log_message));
    }
}

/// Captures the `message` field and appends the structured fields as `key=value`.
#[derive(Default)]
struct LogMessageVisitor {
    message: String,
    fields: String,
}

impl LogMessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else {
            format!("{}{}", self.message, self.fields)
        }
    }
}

impl tracing::field::Visit for LogMessageVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::prelude::*;

    #[test]
    fn log_events_reach_the_channel() {
        let (tx, mut rx) = broadcast::channel(8);
        let subscriber = tracing_subscriber::registry().with(EventBroadcastLayer::new(tx));

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(symbol = "TCS.NS", rows = 3, "Using daily fallback.");
        });

        match rx.try_recv().unwrap() {
            PipelineEvent::Log(log) => {
                assert_eq!(log.level, "WARN");
                assert_eq!(log.message, "Using daily fallback. symbol=TCS.NS rows=3");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
