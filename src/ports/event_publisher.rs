//! EventPublisher port - Interface for publishing domain events.
//!
//! The payment core emits events for asynchronous collaborators (email,
//! analytics) without knowing the transport. Delivery is fire-and-forget
//! from the core's perspective; its correctness never depends on it.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing domain events.
///
/// Implementations must ensure:
/// - Events are delivered at-least-once (handlers may receive duplicates)
/// - Errors are propagated to the caller
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Publish multiple events.
    ///
    /// For adapters without atomic publishing, events go out sequentially
    /// with best-effort delivery.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn EventPublisher) {}

    #[test]
    fn trait_is_object_safe() {
        // Compile-time check via assert_object_safe.
    }
}
