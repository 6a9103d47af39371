//! Axum router configuration for payments endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    begin_checkout, create_order, list_orders, momo_ipn, vnpay_ipn, PaymentsAppState,
};

/// Create the payments API router.
///
/// # Routes (require authentication)
/// - `POST /orders` - Create a purchase order
/// - `GET /orders` - List the buyer's orders
/// - `POST /checkout` - Start a gateway payment
pub fn payments_routes() -> Router<PaymentsAppState> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/checkout", post(begin_checkout))
}

/// Create the gateway IPN router.
///
/// Separate from the payments routes because IPNs authenticate by
/// signature, not by user.
///
/// # Routes
/// - `GET|POST /vnpay` - VNPay server-to-server notification
/// - `POST /momo` - MoMo server-to-server notification
pub fn ipn_routes() -> Router<PaymentsAppState> {
    Router::new()
        .route("/vnpay", get(vnpay_ipn).post(vnpay_ipn))
        .route("/momo", post(momo_ipn))
}

/// The complete payments module router, ready to nest under `/api`.
pub fn payments_router() -> Router<PaymentsAppState> {
    Router::new()
        .nest("/payments", payments_routes())
        .nest("/ipn", ipn_routes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use secrecy::SecretString;

    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::gateways::VnpayGateway;
    use crate::adapters::memory::{
        InMemoryEnrollmentStore, InMemoryOrderLedger, InMemoryTransactionLog,
    };
    use crate::config::VnpayConfig;
    use crate::domain::orders::OrderCodeAllocator;
    use crate::ports::GatewayRegistry;

    fn test_state() -> PaymentsAppState {
        let vnpay = VnpayGateway::new(&VnpayConfig {
            tmn_code: "BOOKGATE1".to_string(),
            hash_secret: SecretString::new("secret".to_string()),
            pay_url: "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html".to_string(),
            return_url: "https://bookgate.example/payment/result".to_string(),
        });
        PaymentsAppState {
            ledger: Arc::new(InMemoryOrderLedger::new()),
            transactions: Arc::new(InMemoryTransactionLog::new()),
            enrollments: Arc::new(InMemoryEnrollmentStore::new()),
            gateways: Arc::new(GatewayRegistry::new(vec![Arc::new(vnpay)])),
            events: Arc::new(InMemoryEventBus::new()),
            allocator: Arc::new(OrderCodeAllocator::new()),
        }
    }

    #[test]
    fn payments_routes_creates_router() {
        let router = payments_routes();
        let _: Router<()> = router.with_state(test_state());
    }

    #[test]
    fn ipn_routes_creates_router() {
        let router = ipn_routes();
        let _: Router<()> = router.with_state(test_state());
    }

    #[test]
    fn payments_router_creates_combined_router() {
        let router = payments_router();
        let _: Router<()> = router.with_state(test_state());
    }

    // Full request/response coverage lives in the integration tests, which
    // drive the router with signed gateway callbacks.
}
