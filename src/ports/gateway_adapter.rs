//! GatewayAdapter port - the per-provider capability set.
//!
//! Every gateway implements the same four capabilities - verify, extract,
//! normalize amount, acknowledge - plus checkout initiation. The
//! reconciliation engine selects an adapter by the tag on the inbound
//! route instead of branching on providers inline.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use crate::domain::foundation::DomainError;
use crate::domain::orders::Order;
use crate::domain::payments::{
    CallbackFacts, GatewayProvider, ReconcileError, ReconcileOutcome,
};

/// Request context a checkout needs from the caller.
#[derive(Debug, Clone)]
pub struct CheckoutContext {
    /// Client IP forwarded to gateways that require it.
    pub client_ip: String,
    /// Where the gateway sends the buyer after payment.
    pub return_url: String,
}

/// What a gateway hands back when a checkout starts.
#[derive(Debug, Clone)]
pub enum CheckoutIntent {
    /// Hosted payment page; redirect the buyer there.
    Redirect { url: String },
    /// Wallet payment with optional QR code and app deeplink.
    Wallet {
        pay_url: String,
        qr_code_url: Option<String>,
        deeplink: Option<String>,
    },
}

/// Port implemented once per payment gateway.
#[async_trait]
pub trait GatewayAdapter: Send + Sync {
    /// The provider this adapter speaks for.
    fn provider(&self) -> GatewayProvider;

    /// Recomputes the gateway signature over the raw parameters exactly as
    /// received and compares it in constant time.
    fn verify(&self, params: &BTreeMap<String, String>) -> bool;

    /// Pulls the order reference, gateway transaction id, and result code
    /// out of the raw parameters.
    ///
    /// # Errors
    ///
    /// `ReconcileError::Malformed` when required fields are absent.
    fn extract(&self, params: &BTreeMap<String, String>) -> Result<CallbackFacts, ReconcileError>;

    /// Normalizes the gateway's raw amount field into currency units.
    ///
    /// Only called after `verify` has succeeded - the signed bytes are
    /// always the gateway's own, never a post-processed value.
    fn paid_amount(&self, params: &BTreeMap<String, String>) -> Result<Decimal, ReconcileError>;

    /// Starts a payment for the order: builds the signed request and, where
    /// the provider requires it, calls the gateway API.
    async fn begin_checkout(
        &self,
        order: &Order,
        ctx: &CheckoutContext,
    ) -> Result<CheckoutIntent, DomainError>;

    /// Provider-native acknowledgment body for an IPN response, built so
    /// the gateway can tell "fully processed" from "retry me".
    fn acknowledge(&self, result: &Result<ReconcileOutcome, ReconcileError>) -> JsonValue;
}

/// Adapters keyed by provider tag.
pub struct GatewayRegistry {
    adapters: HashMap<GatewayProvider, Arc<dyn GatewayAdapter>>,
}

impl GatewayRegistry {
    /// Builds a registry from the configured adapters.
    pub fn new(adapters: Vec<Arc<dyn GatewayAdapter>>) -> Self {
        Self {
            adapters: adapters
                .into_iter()
                .map(|adapter| (adapter.provider(), adapter))
                .collect(),
        }
    }

    /// Returns the adapter for a provider, if one is registered.
    pub fn get(&self, provider: GatewayProvider) -> Option<Arc<dyn GatewayAdapter>> {
        self.adapters.get(&provider).cloned()
    }
}
