//! OrderLedger port - order persistence and the locked settlement transition.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrderId, UserId};
use crate::domain::orders::{Order, OrderCode, OrderStatus};

/// Result of a settlement attempt.
#[derive(Debug, Clone)]
pub struct Transition {
    /// The order after the attempt.
    pub order: Order,
    /// True when this call performed the transition. False means the order
    /// was already settled and nothing changed - callers use this to
    /// provision access exactly once.
    pub applied: bool,
}

/// Port for order storage.
///
/// Implementations must guarantee two things beyond plain CRUD:
///
/// - `insert` enforces global uniqueness of `order_code` and reports a
///   conflict as `ErrorCode::DuplicateOrderCode`, so callers can retry
///   allocation.
/// - `transition` holds an exclusive per-order lock for the whole
///   read-decide-write sequence. Two callbacks racing on the same order
///   serialize here; unrelated orders must not block each other.
#[async_trait]
pub trait OrderLedger: Send + Sync {
    /// Persists a new order.
    async fn insert(&self, order: Order) -> Result<Order, DomainError>;

    /// Looks up an order by id.
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError>;

    /// Looks up an order by its gateway-facing code.
    async fn find_by_code(&self, code: &OrderCode) -> Result<Option<Order>, DomainError>;

    /// Lists a buyer's orders, newest first, optionally filtered by status.
    async fn list_for_buyer(
        &self,
        buyer: &UserId,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, DomainError>;

    /// Settles an order under an exclusive per-order lock.
    ///
    /// If the order is already in a terminal state the call is a no-op
    /// returning the stored order with `applied = false` - callback
    /// redelivery is idempotent by construction, not by error handling.
    ///
    /// # Errors
    ///
    /// `ErrorCode::OrderNotFound` if the order does not exist.
    async fn transition(
        &self,
        id: &OrderId,
        target: OrderStatus,
    ) -> Result<Transition, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_ledger_is_object_safe() {
        fn _accepts_dyn(_ledger: &dyn OrderLedger) {}
    }
}
