//! Reconciliation error taxonomy.
//!
//! Every variant maps to a provider-native rejection in the HTTP adapters;
//! messages stay generic so an attacker probing the IPN endpoint learns
//! nothing about which check tripped.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Errors raised while reconciling a gateway callback.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The callback payload is structurally broken (missing order reference
    /// or result code). Rejected before the ledger is touched.
    #[error("Malformed callback")]
    Malformed(String),

    /// No gateway adapter is registered for the callback's provider tag.
    #[error("Unknown payment provider")]
    UnknownProvider,

    /// Signature recomputation did not match the claimed signature.
    /// Always recorded on the audit trail, always settles the order FAILED.
    #[error("Signature verification failed")]
    Authenticity,

    /// The callback's normalized amount differs from the order amount.
    #[error("Amount mismatch")]
    AmountMismatch,

    /// The gateway's own result code was not its success sentinel.
    #[error("Gateway reported failure")]
    GatewayDeclined { code: String },

    /// The callback references an order this system never created.
    /// Fails fast; no state is mutated.
    #[error("Order not found")]
    OrderNotFound,

    /// The ledger or audit log could not be reached.
    #[error("Ledger error: {0}")]
    Ledger(String),
}

impl ReconcileError {
    /// True when a gateway redelivery might succeed (transient storage
    /// trouble, eventual consistency on order creation).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ReconcileError::Ledger(_) | ReconcileError::OrderNotFound
        )
    }
}

impl From<DomainError> for ReconcileError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::OrderNotFound => ReconcileError::OrderNotFound,
            _ => ReconcileError::Ledger(err.to_string()),
        }
    }
}
