//! Order status state machine.
//!
//! An order starts out pending and settles exactly once. All settled states
//! are sinks: once an order is paid, failed, or cancelled it never moves
//! again, which makes callback redelivery a no-op by construction.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a purchase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created by a checkout request, awaiting gateway confirmation.
    Pending,

    /// Gateway confirmed the payment. Terminal.
    Paid,

    /// Signature, amount, or gateway result check failed. Terminal.
    Failed,

    /// Buyer abandoned the order. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Returns true once the order has settled and can no longer move.
    pub fn is_settled(&self) -> bool {
        self.is_terminal()
    }
}

impl StateMachine for OrderStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use OrderStatus::*;
        matches!(
            (self, target),
            (Pending, Paid) | (Pending, Failed) | (Pending, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use OrderStatus::*;
        match self {
            Pending => vec![Paid, Failed, Cancelled],
            Paid | Failed | Cancelled => vec![],
        }
    }
}
