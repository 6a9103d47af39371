//! Domain events emitted after reconciliation settles an order.
//!
//! Confirmation email and analytics workers consume these off the event
//! bus; the reconciliation engine emits and moves on.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BookId, EventId, OrderId, Timestamp, UserId};
use crate::domain::orders::OrderCode;
use crate::domain_event;

use super::GatewayProvider;

/// A gateway callback passed every check and the order settled PAID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfirmed {
    pub event_id: EventId,
    pub order_id: OrderId,
    pub order_code: OrderCode,
    pub buyer: UserId,
    pub book: BookId,
    pub amount: Decimal,
    pub currency: String,
    pub provider: GatewayProvider,
    pub confirmed_at: Timestamp,
}

domain_event!(
    PaymentConfirmed,
    event_type = "payment.confirmed.v1",
    schema_version = 1,
    aggregate_id = order_id,
    aggregate_type = "Order",
    occurred_at = confirmed_at,
    event_id = event_id
);

/// A callback failed verification or reconciliation and the order settled
/// FAILED.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRejected {
    pub event_id: EventId,
    pub order_id: OrderId,
    pub order_code: OrderCode,
    pub provider: GatewayProvider,
    pub reason: String,
    pub occurred_at: Timestamp,
}

domain_event!(
    PaymentRejected,
    event_type = "payment.rejected.v1",
    schema_version = 1,
    aggregate_id = order_id,
    aggregate_type = "Order",
    occurred_at = occurred_at,
    event_id = event_id
);
