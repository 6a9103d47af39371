//! Inbound gateway callback representation.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use crate::domain::orders::OrderCode;

use super::GatewayProvider;

/// One IPN callback as delivered by a gateway: the provider tag from the
/// route it arrived on, plus the raw parameter set exactly as received.
#[derive(Debug, Clone)]
pub struct GatewayCallback {
    pub provider: GatewayProvider,
    pub params: BTreeMap<String, String>,
}

impl GatewayCallback {
    /// Wraps a parameter set (form/query style callbacks).
    pub fn new(provider: GatewayProvider, params: BTreeMap<String, String>) -> Self {
        Self { provider, params }
    }

    /// Flattens a top-level JSON object into string parameters
    /// (MoMo posts JSON with numeric amounts and result codes).
    pub fn from_json(provider: GatewayProvider, value: &JsonValue) -> Self {
        let mut params = BTreeMap::new();
        if let Some(object) = value.as_object() {
            for (key, value) in object {
                let rendered = match value {
                    JsonValue::String(s) => s.clone(),
                    JsonValue::Number(n) => n.to_string(),
                    JsonValue::Bool(b) => b.to_string(),
                    JsonValue::Null => String::new(),
                    other => other.to_string(),
                };
                params.insert(key.clone(), rendered);
            }
        }
        Self { provider, params }
    }

    /// The verbatim payload for the audit trail.
    pub fn raw_json(&self) -> JsonValue {
        serde_json::to_value(&self.params).unwrap_or(JsonValue::Null)
    }
}

/// What the gateway itself reported for the payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    /// The gateway's success sentinel matched.
    Success,
    /// The gateway reported a failure with its own result code.
    Declined { code: String },
}

impl GatewayOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, GatewayOutcome::Success)
    }
}

/// Structural facts pulled out of a callback before any trust decision:
/// which order it references, the gateway's own transaction id, and the
/// gateway-reported outcome. Amounts are deliberately absent - they are
/// normalized only after the signature verifies.
#[derive(Debug, Clone)]
pub struct CallbackFacts {
    pub order_code: OrderCode,
    pub provider_txn_id: Option<String>,
    pub outcome: GatewayOutcome,
}
