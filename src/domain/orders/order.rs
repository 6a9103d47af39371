//! Order entity - a buyer's purchase intent for one book.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    BookId, OrderId, StateMachine, Timestamp, UserId, ValidationError,
};
use crate::domain::payments::GatewayProvider;

use super::{OrderCode, OrderStatus};

/// A purchase intent. Amount and currency are fixed at creation; only the
/// status (and `paid_at`) ever change afterwards, and only through the
/// ledger's locked transition. Orders are never deleted - they are the
/// financial audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_code: OrderCode,
    pub buyer: UserId,
    pub book: BookId,
    pub amount: Decimal,
    pub currency: String,
    pub provider: GatewayProvider,
    pub status: OrderStatus,
    pub paid_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Order {
    /// Creates a new pending order.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the amount is not positive or the
    /// currency is empty.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        order_code: OrderCode,
        buyer: UserId,
        book: BookId,
        amount: Decimal,
        currency: impl Into<String>,
        provider: GatewayProvider,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        let currency = currency.into();
        if amount <= Decimal::ZERO {
            return Err(ValidationError::not_positive("amount", amount.to_string()));
        }
        if currency.trim().is_empty() {
            return Err(ValidationError::empty_field("currency"));
        }

        Ok(Self {
            id: OrderId::new(),
            order_code,
            buyer,
            book,
            amount,
            currency,
            provider,
            status: OrderStatus::Pending,
            paid_at: None,
            created_at: now,
        })
    }

    /// Applies a settlement transition, recording `paid_at` when the target
    /// is `Paid`.
    ///
    /// Callers must hold the per-order lock for the read-decide-write
    /// sequence; this method only enforces the state machine.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the transition is not allowed.
    pub fn settle(&mut self, target: OrderStatus, now: Timestamp) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(target)?;
        if self.status == OrderStatus::Paid {
            self.paid_at = Some(now);
        }
        Ok(())
    }

    /// Check if the order has been paid.
    pub fn is_paid(&self) -> bool {
        self.status == OrderStatus::Paid
    }

    /// Check if the order still awaits settlement.
    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }
}
