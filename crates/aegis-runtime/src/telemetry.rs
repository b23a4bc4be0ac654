//! Bounded in-process telemetry log.
//!
//! Lives only as long as the tab. Entries are mirrored to `tracing` at a
//! level matching their kind.

use aegis_types::EventId;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Default number of retained events.
pub const DEFAULT_CAPACITY: usize = 50;

/// Severity of a telemetry event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TelemetryKind {
    Info,
    Success,
    Warning,
    Error,
}

/// One telemetry entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub id: EventId,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: TelemetryKind,
}

/// Newest-first ring of at most `capacity` events.
///
/// Cheap to clone; clones share the same log.
///
/// # Example
///
/// ```
/// use aegis_runtime::telemetry::{TelemetryKind, TelemetryLog};
///
/// let log = TelemetryLog::with_capacity(2);
/// log.push("one", TelemetryKind::Info);
/// log.push("two", TelemetryKind::Success);
/// log.push("three", TelemetryKind::Warning);
///
/// let messages: Vec<_> = log.entries().into_iter().map(|e| e.message).collect();
/// assert_eq!(messages, ["three", "two"]);
/// ```
#[derive(Debug, Clone)]
pub struct TelemetryLog {
    events: Arc<Mutex<VecDeque<TelemetryEvent>>>,
    capacity: usize,
}

impl TelemetryLog {
    /// Creates a log holding [`DEFAULT_CAPACITY`] events.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a log holding at most `capacity` events.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Returns the retention limit.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records an event, evicting the oldest beyond capacity.
    pub fn push(&self, message: impl Into<String>, kind: TelemetryKind) -> EventId {
        let event = TelemetryEvent {
            id: EventId::new(),
            timestamp: Utc::now(),
            message: message.into(),
            kind,
        };

        match kind {
            TelemetryKind::Info | TelemetryKind::Success => {
                info!(id = %event.id, kind = ?kind, "{}", event.message);
            }
            TelemetryKind::Warning => warn!(id = %event.id, "{}", event.message),
            TelemetryKind::Error => error!(id = %event.id, "{}", event.message),
        }

        let id = event.id;
        let mut events = self.events.lock();
        events.push_front(event);
        events.truncate(self.capacity);
        id
    }

    /// Returns a snapshot, newest first.
    #[must_use]
    pub fn entries(&self) -> Vec<TelemetryEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Number of retained events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns `true` if nothing is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Drops every event.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Default for TelemetryLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_fifty_newest_first() {
        let log = TelemetryLog::new();
        for i in 0..60 {
            log.push(format!("event {i}"), TelemetryKind::Info);
        }

        let entries = log.entries();
        assert_eq!(entries.len(), 50);
        assert_eq!(entries[0].message, "event 59");
        assert_eq!(entries[49].message, "event 10");
    }

    #[test]
    fn ids_are_unique() {
        let log = TelemetryLog::new();
        let a = log.push("a", TelemetryKind::Info);
        let b = log.push("b", TelemetryKind::Info);
        assert_ne!(a, b);
    }

    #[test]
    fn clear_empties_shared_log() {
        let log = TelemetryLog::new();
        let clone = log.clone();
        log.push("x", TelemetryKind::Error);
        assert_eq!(clone.len(), 1);

        clone.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn zero_capacity_retains_nothing() {
        let log = TelemetryLog::with_capacity(0);
        log.push("x", TelemetryKind::Info);
        assert!(log.is_empty());
    }

    #[test]
    fn event_json_shape() {
        let log = TelemetryLog::new();
        log.push("Sentinel armed", TelemetryKind::Success);
        let json = serde_json::to_value(&log.entries()[0]).unwrap();

        assert_eq!(json["type"], "success");
        assert_eq!(json["message"], "Sentinel armed");
        assert!(json["id"].is_string());
        assert!(json["timestamp"].is_string());
    }
}
