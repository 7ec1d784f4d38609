//! Injected structured logger for reconciliation events.
//!
//! The reconciler never touches global logging state directly; callers hand it
//! a [`MoveLogger`]. The CLI uses [`TracingLogger`], tests use [`CapturingLogger`].

use std::cell::RefCell;
pub use tracing::Level;
use tracing::{debug, error, info, trace, warn};

/// Sink for reconciliation events: a level, a fixed message, and key/value fields.
pub trait MoveLogger {
    fn log(&self, level: Level, message: &str, fields: &[(&str, &str)]);
}

/// Forwards events to the `tracing` subscriber installed by the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl MoveLogger for TracingLogger {
    fn log(&self, level: Level, message: &str, fields: &[(&str, &str)]) {
        let fields = render_fields(fields);
        match level {
            Level::ERROR => error!(target: "mirror_move::reconcile", %fields, "{}", message),
            Level::WARN => warn!(target: "mirror_move::reconcile", %fields, "{}", message),
            Level::INFO => info!(target: "mirror_move::reconcile", %fields, "{}", message),
            Level::DEBUG => debug!(target: "mirror_move::reconcile", %fields, "{}", message),
            _ => trace!(target: "mirror_move::reconcile", %fields, "{}", message),
        }
    }
}

fn render_fields(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One captured event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub level: Level,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl LogEvent {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Records every event in memory
#[derive(Debug, Default)]
pub struct CapturingLogger {
    events: RefCell<Vec<LogEvent>>,
}

impl CapturingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events.borrow().clone()
    }

    /// Events with the given message, in emission order
    pub fn with_message(&self, message: &str) -> Vec<LogEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.message == message)
            .cloned()
            .collect()
    }
}

impl MoveLogger for CapturingLogger {
    fn log(&self, level: Level, message: &str, fields: &[(&str, &str)]) {
        self.events.borrow_mut().push(LogEvent {
            level,
            message: message.to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
    }
}
