//! Transaction audit records - one per received gateway callback.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::foundation::{OrderId, Timestamp, TransactionId};

/// Gateway-reported status captured on the audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Success,
    Failed,
    Pending,
}

/// Immutable record of one callback received for an order.
///
/// Appended for every callback - forged and corrupted ones included; this
/// is the non-repudiation trail for fraud investigation. Never mutated
/// after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub order_id: OrderId,
    /// Gateway's own transaction id; not guaranteed unique across providers.
    pub provider_txn_id: Option<String>,
    pub status: TransactionStatus,
    /// Verbatim capture of the callback payload.
    pub raw_payload: JsonValue,
    /// Whether cryptographic verification passed.
    pub signed_ok: bool,
    /// Whether the callback went through the reconciliation protocol.
    pub ipn_verified: bool,
    pub created_at: Timestamp,
}

impl TransactionRecord {
    /// Builds the audit record for one processed callback.
    pub fn record(
        order_id: OrderId,
        provider_txn_id: Option<String>,
        status: TransactionStatus,
        raw_payload: JsonValue,
        signed_ok: bool,
        now: Timestamp,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            order_id,
            provider_txn_id,
            status,
            raw_payload,
            signed_ok,
            ipn_verified: true,
            created_at: now,
        }
    }
}
