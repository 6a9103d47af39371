//! In-memory event bus implementation for testing.
//!
//! Provides synchronous, deterministic event capture for unit tests.
//! Production deployments wire a queue-backed publisher here instead;
//! the payment core only ever sees the `EventPublisher` port.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::ports::EventPublisher;

/// In-memory event bus.
///
/// Captures published envelopes for assertions.
///
/// # Panics
///
/// Methods panic if the lock is poisoned. Acceptable for test code; this
/// adapter is not meant for production.
pub struct InMemoryEventBus {
    published: RwLock<Vec<EventEnvelope>>,
}

impl InMemoryEventBus {
    /// Creates a new empty event bus.
    pub fn new() -> Self {
        Self {
            published: RwLock::new(Vec::new()),
        }
    }

    // === Test Helpers ===

    /// Returns all published events (for test assertions).
    pub fn published(&self) -> Vec<EventEnvelope> {
        self.published.read().expect("event bus lock poisoned").clone()
    }

    /// Number of events published so far.
    pub fn event_count(&self) -> usize {
        self.published.read().expect("event bus lock poisoned").len()
    }

    /// Whether an event of the given type was published.
    pub fn has_event(&self, event_type: &str) -> bool {
        self.published
            .read()
            .expect("event bus lock poisoned")
            .iter()
            .any(|event| event.event_type == event_type)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        self.published
            .write()
            .expect("event bus lock poisoned")
            .push(event);
        Ok(())
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        self.published
            .write()
            .expect("event bus lock poisoned")
            .extend(events);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{EventId, EventMetadata, Timestamp};
    use serde_json::json;

    fn envelope(event_type: &str) -> EventEnvelope {
        EventEnvelope {
            event_id: EventId::new(),
            event_type: event_type.to_string(),
            schema_version: 1,
            aggregate_id: "order-1".to_string(),
            aggregate_type: "Order".to_string(),
            occurred_at: Timestamp::now(),
            payload: json!({}),
            metadata: EventMetadata::default(),
        }
    }

    #[tokio::test]
    async fn publish_captures_the_event() {
        let bus = InMemoryEventBus::new();
        bus.publish(envelope("payment.confirmed.v1")).await.unwrap();

        assert_eq!(bus.event_count(), 1);
        assert!(bus.has_event("payment.confirmed.v1"));
        assert!(!bus.has_event("payment.rejected.v1"));
    }

    #[tokio::test]
    async fn publish_all_captures_every_event() {
        let bus = InMemoryEventBus::new();
        bus.publish_all(vec![
            envelope("payment.confirmed.v1"),
            envelope("payment.rejected.v1"),
        ])
        .await
        .unwrap();

        assert_eq!(bus.event_count(), 2);
        assert_eq!(bus.published().len(), 2);
    }
}
