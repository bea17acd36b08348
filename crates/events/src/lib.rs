//! Shared event contracts for clipboard history.
//!
//! The core pushes exactly one kind of notification outward: a history
//! change carrying the newly accepted record. Using a shared type keeps the
//! producer and any presentation layer agreeing on field names.
//!
//! Also provides the `EventBus` trait for decoupled event emission.

mod bus;

pub use bus::{EmittedEvent, EventBus, EventBusRef, InMemoryEventBus, NullEventBus, TracingEventBus};

use clipkeep_history::ClipRecord;
use serde::{Deserialize, Serialize};

/// Event emitted after each successful append.
///
/// Producers: pasteboard watcher
/// Consumers: presentation layer
///
/// Preview bytes are not included; fetch the record by id to get them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryChangedEvent {
    pub record: ClipRecord,
}

impl HistoryChangedEvent {
    pub fn new(record: ClipRecord) -> Self {
        Self { record }
    }

    /// Emit on `bus` under [`event_names::HISTORY_CHANGED`].
    pub fn emit(&self, bus: &dyn EventBus) {
        match serde_json::to_value(self) {
            Ok(payload) => bus.emit(event_names::HISTORY_CHANGED, payload),
            Err(e) => tracing::error!(id = self.record.id, error = %e, "Failed to serialize history event"),
        }
    }
}

/// Event names as constants to prevent typos.
pub mod event_names {
    /// A record was added to history.
    pub const HISTORY_CHANGED: &str = "history:changed";
}
