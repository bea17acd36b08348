//! Where the capture pipeline sends "history changed" notifications.
//!
//! The host picks the sink: a UI bridge, the log, or a recorder in tests.

use std::sync::{Arc, Mutex, MutexGuard};

/// Sink for history notifications. Called from the watcher thread.
pub trait EventBus: Send + Sync {
    /// `topic` is one of [`crate::event_names`]; `payload` is the serialized event.
    fn emit(&self, topic: &str, payload: serde_json::Value);
}

pub type EventBusRef = Arc<dyn EventBus>;

/// Records every notification so tests can assert on what was captured.
#[derive(Default)]
pub struct InMemoryEventBus {
    events: Mutex<Vec<EmittedEvent>>,
}

#[derive(Debug, Clone)]
pub struct EmittedEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    // Recovers from poisoning; a panic elsewhere must not hide later events.
    fn guard(&self) -> MutexGuard<'_, Vec<EmittedEvent>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn events(&self) -> Vec<EmittedEvent> {
        self.guard().clone()
    }

    pub fn events_for(&self, topic: &str) -> Vec<EmittedEvent> {
        self.guard()
            .iter()
            .filter(|e| e.topic == topic)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.guard().clear();
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }
}

impl EventBus for InMemoryEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        self.guard().push(EmittedEvent {
            topic: topic.to_string(),
            payload,
        });
    }
}

/// Default sink when the host does not listen for history changes.
pub struct NullEventBus;

impl EventBus for NullEventBus {
    fn emit(&self, _topic: &str, _payload: serde_json::Value) {}
}

/// Event bus that reports emissions to the tracing subscriber.
///
/// Logs the topic plus the record id and type when present. Payload
/// content is never written to the log.
pub struct TracingEventBus;

impl EventBus for TracingEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        let record = payload.get("record");
        let id = record.and_then(|r| r.get("id")).and_then(|v| v.as_i64());
        let content_type = record
            .and_then(|r| r.get("contentType"))
            .and_then(|v| v.as_str());
        tracing::info!(topic, id, content_type, "Event emitted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_in_memory_bus_filters_by_topic() {
        let bus = InMemoryEventBus::new();

        bus.emit("history:changed", json!({"record": {"id": 1}}));
        bus.emit("test:other", json!({}));
        bus.emit("history:changed", json!({"record": {"id": 2}}));

        assert_eq!(bus.len(), 3);
        let changed = bus.events_for("history:changed");
        assert_eq!(changed.len(), 2);
        assert_eq!(changed[1].payload["record"]["id"], 2);
        assert!(bus.events_for("history:missing").is_empty());

        bus.clear();
        assert!(bus.is_empty());
    }

    #[test]
    fn test_poisoned_lock_still_records() {
        let bus = Arc::new(InMemoryEventBus::new());
        let poisoner = Arc::clone(&bus);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.events.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        bus.emit("history:changed", json!({}));
        assert_eq!(bus.len(), 1);
    }

    #[test]
    fn test_shared_bus_reference() {
        let bus = Arc::new(InMemoryEventBus::new());
        let shared: EventBusRef = bus.clone();

        shared.emit("history:changed", json!({"record": {"id": 1}}));
        assert_eq!(bus.len(), 1);
    }

    #[test]
    fn test_null_and_tracing_buses_accept_anything() {
        NullEventBus.emit("test:event", json!({"data": "ignored"}));
        TracingEventBus.emit("history:changed", json!({"record": {"id": 3, "contentType": "url"}}));
        TracingEventBus.emit("history:changed", json!(null));
    }
}
