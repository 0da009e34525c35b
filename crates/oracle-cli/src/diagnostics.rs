//! Tracing setup for the CLI.
//!
//! Besides the usual stderr formatter, a layer copies every WARN and ERROR
//! event into a channel so a command can summarise what went wrong once it
//! finishes.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use tokio::sync::mpsc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// A captured warning or error.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Diagnostic {
    pub target: String,
    pub level: String,
    pub message: String,
    /// Structured fields other than the message
    pub fields: HashMap<String, Value>,
    pub timestamp: String,
}

impl fmt::Display for Diagnostic {
    /// `LEVEL target: message key=value ...`, fields sorted by name.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.level, self.target, self.message)?;
        let mut keys: Vec<&String> = self.fields.keys().collect();
        keys.sort();
        for key in keys {
            write!(f, " {}={}", key, self.fields[key])?;
        }
        Ok(())
    }
}

/// Layer forwarding WARN and ERROR events to a channel.
pub struct DiagnosticLayer {
    sender: mpsc::UnboundedSender<Diagnostic>,
}

impl DiagnosticLayer {
    pub fn new(sender: mpsc::UnboundedSender<Diagnostic>) -> Self {
        Self { sender }
    }
}

impl<S> Layer<S> for DiagnosticLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        // Levels compare by verbosity: anything above WARN is info or finer.
        if *event.metadata().level() > Level::WARN {
            return;
        }

        let mut fields = HashMap::new();
        event.record(&mut FieldVisitor(&mut fields));
        let message = fields
            .remove("message")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();

        let diagnostic = Diagnostic {
            target: event.metadata().target().to_string(),
            level: event.metadata().level().to_string(),
            message,
            fields,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        // A dropped receiver only means nobody wants the summary.
        let _ = self.sender.send(diagnostic);
    }
}

/// Field visitor that extracts tracing event fields into a HashMap
struct FieldVisitor<'a>(&'a mut HashMap<String, Value>);

impl tracing::field::Visit for FieldVisitor<'_> {
    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(format!("{:?}", value)));
    }
}

/// Installs the global subscriber and returns the diagnostics receiver.
///
/// `RUST_LOG` overrides the default `info` filter.
pub fn init() -> mpsc::UnboundedReceiver<Diagnostic> {
    let (sender, receiver) = mpsc::unbounded_channel();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(DiagnosticLayer::new(sender))
        .init();

    receiver
}

/// Takes everything captured so far without waiting.
pub fn drain(receiver: &mut mpsc::UnboundedReceiver<Diagnostic>) -> Vec<Diagnostic> {
    let mut captured = Vec::new();
    while let Ok(diagnostic) = receiver.try_recv() {
        captured.push(diagnostic);
    }
    captured
}
