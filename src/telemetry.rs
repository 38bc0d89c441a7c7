//! Telemetry sinks for probe results.

use serde_json::{Map, Value};
use std::sync::{Mutex, PoisonError};

/// Event emitted once per probe.
pub const JUPYTER_INSTALLED_EVENT: &str = "DS_INTERNAL.JUPYTER_INSTALLED";

/// Property bag attached to an event.
pub type TelemetryProperties = Map<String, Value>;

/// Destination for telemetry events.
///
/// Sending is fire-and-forget: implementations must not block for long and
/// have no way to report failure back to the caller.
pub trait TelemetrySink: Send + Sync {
    /// Record one event.
    fn send_event(&self, name: &str, properties: TelemetryProperties);
}

/// Sink that writes every event to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn send_event(&self, name: &str, properties: TelemetryProperties) {
        let properties = Value::Object(properties);
        tracing::info!(event = name, properties = %properties, "telemetry event");
    }
}

/// A recorded telemetry event.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    /// Event name.
    pub name: String,
    /// Properties sent with it.
    pub properties: TelemetryProperties,
}

/// Sink that keeps events in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<RecordedEvent>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all events received so far.
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of events received so far.
    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no event has been received.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TelemetrySink for MemorySink {
    fn send_event(&self, name: &str, properties: TelemetryProperties) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedEvent {
                name: name.to_string(),
                properties,
            });
    }
}

impl<T: TelemetrySink + ?Sized> TelemetrySink for std::sync::Arc<T> {
    fn send_event(&self, name: &str, properties: TelemetryProperties) {
        (**self).send_event(name, properties)
    }
}
