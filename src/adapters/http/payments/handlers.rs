//! HTTP handlers for order, checkout, and IPN endpoints.
//!
//! API endpoints authenticate the buyer; IPN endpoints authenticate by
//! signature inside the reconciliation engine and always answer with the
//! provider's native acknowledgment body.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Json, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use serde_json::json;

use crate::application::handlers::orders::{
    CreateOrderCommand, CreateOrderHandler, ListOrdersHandler, ListOrdersQuery,
};
use crate::application::handlers::payments::{BeginCheckoutCommand, BeginCheckoutHandler};
use crate::domain::foundation::{BookId, OrderId, UserId};
use crate::domain::orders::{OrderCodeAllocator, OrderError};
use crate::domain::payments::{
    GatewayCallback, GatewayProvider, ReconciliationEngine,
};
use crate::domain::access::EnrollmentProvisioner;
use crate::ports::{
    EnrollmentStore, EventPublisher, GatewayRegistry, OrderLedger, TransactionLog,
};

use super::dto::{
    BeginCheckoutRequest, CheckoutResponse, CreateOrderRequest, ErrorResponse, ListOrdersParams,
    OrderResponse, OrdersResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared dependencies for the payments module.
///
/// Cloned per request; everything inside is Arc-wrapped.
#[derive(Clone)]
pub struct PaymentsAppState {
    pub ledger: Arc<dyn OrderLedger>,
    pub transactions: Arc<dyn TransactionLog>,
    pub enrollments: Arc<dyn EnrollmentStore>,
    pub gateways: Arc<GatewayRegistry>,
    pub events: Arc<dyn EventPublisher>,
    pub allocator: Arc<OrderCodeAllocator>,
}

impl PaymentsAppState {
    pub fn create_order_handler(&self) -> CreateOrderHandler {
        CreateOrderHandler::new(
            self.ledger.clone(),
            self.enrollments.clone(),
            self.allocator.clone(),
        )
    }

    pub fn list_orders_handler(&self) -> ListOrdersHandler {
        ListOrdersHandler::new(self.ledger.clone())
    }

    pub fn begin_checkout_handler(&self) -> BeginCheckoutHandler {
        BeginCheckoutHandler::new(self.ledger.clone(), self.gateways.clone())
    }

    pub fn reconciliation_engine(&self) -> ReconciliationEngine {
        ReconciliationEngine::new(
            self.gateways.clone(),
            self.ledger.clone(),
            self.transactions.clone(),
            EnrollmentProvisioner::new(self.enrollments.clone()),
            self.events.clone(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Authentication
// ════════════════════════════════════════════════════════════════════════════════

/// Authenticated buyer extracted from the request.
///
/// In production this comes from the session middleware; development and
/// tests supply an `X-User-Id` header.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection type for AuthenticatedUser extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let user_id = parts
                .headers
                .get("X-User-Id")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<UserId>().ok())
                .ok_or(AuthenticationRequired)?;

            Ok(AuthenticatedUser { user_id })
        })
    }
}

/// Client address for gateways that require it, honoring the proxy header.
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .unwrap_or_else(|| "0.0.0.0".to_string())
}

// ════════════════════════════════════════════════════════════════════════════════
// API Error Mapping
// ════════════════════════════════════════════════════════════════════════════════

/// Maps application errors onto HTTP statuses without leaking internals.
pub struct PaymentsApiError(OrderError);

impl From<OrderError> for PaymentsApiError {
    fn from(err: OrderError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PaymentsApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match &self.0 {
            OrderError::AlreadyEnrolled => (
                StatusCode::CONFLICT,
                "ALREADY_ENROLLED",
                self.0.to_string(),
            ),
            OrderError::NotFound => {
                (StatusCode::NOT_FOUND, "ORDER_NOT_FOUND", self.0.to_string())
            }
            OrderError::NotPayable => {
                (StatusCode::CONFLICT, "ORDER_NOT_PAYABLE", self.0.to_string())
            }
            OrderError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", self.0.to_string()),
            OrderError::Validation(err) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_FAILED", err.to_string())
            }
            OrderError::CodeCollision(_) | OrderError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal error".to_string(),
            ),
        };
        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Order & Checkout Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/payments/orders - Create a purchase order
pub async fn create_order(
    State(state): State<PaymentsAppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, PaymentsApiError> {
    let handler = state.create_order_handler();
    let cmd = CreateOrderCommand {
        buyer: user.user_id,
        book: BookId::from_uuid(request.book_id),
        amount: request.amount,
        currency: request.currency,
        provider: request.provider,
    };

    let order = handler.handle(cmd).await?;

    Ok((StatusCode::CREATED, Json(OrderResponse::from(order))))
}

/// GET /api/payments/orders - List the buyer's orders
pub async fn list_orders(
    State(state): State<PaymentsAppState>,
    user: AuthenticatedUser,
    Query(params): Query<ListOrdersParams>,
) -> Result<impl IntoResponse, PaymentsApiError> {
    let handler = state.list_orders_handler();
    let query = ListOrdersQuery {
        buyer: user.user_id,
        status: params.status,
    };

    let orders = handler.handle(query).await?;

    Ok(Json(OrdersResponse {
        orders: orders.into_iter().map(OrderResponse::from).collect(),
    }))
}

/// POST /api/payments/checkout - Start a gateway payment
pub async fn begin_checkout(
    State(state): State<PaymentsAppState>,
    user: AuthenticatedUser,
    headers: HeaderMap,
    Json(request): Json<BeginCheckoutRequest>,
) -> Result<impl IntoResponse, PaymentsApiError> {
    let handler = state.begin_checkout_handler();
    let cmd = BeginCheckoutCommand {
        buyer: user.user_id,
        order_id: OrderId::from_uuid(request.order_id),
        return_url: request.return_url,
        client_ip: client_ip(&headers),
    };

    let intent = handler.handle(cmd).await?;

    Ok((StatusCode::CREATED, Json(CheckoutResponse::from(intent))))
}

// ════════════════════════════════════════════════════════════════════════════════
// IPN Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET|POST /api/ipn/vnpay - VNPay server-to-server notification
///
/// VNPay delivers IPN parameters in the query string. The HTTP status is
/// always 200; the body's RspCode tells VNPay whether to redeliver.
pub async fn vnpay_ipn(
    State(state): State<PaymentsAppState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let callback = GatewayCallback::new(GatewayProvider::Vnpay, params.into_iter().collect());
    process_ipn(state, GatewayProvider::Vnpay, callback).await
}

/// POST /api/ipn/momo - MoMo server-to-server notification
pub async fn momo_ipn(
    State(state): State<PaymentsAppState>,
    Json(payload): Json<serde_json::Value>,
) -> impl IntoResponse {
    let callback = GatewayCallback::from_json(GatewayProvider::Momo, &payload);
    process_ipn(state, GatewayProvider::Momo, callback).await
}

async fn process_ipn(
    state: PaymentsAppState,
    provider: GatewayProvider,
    callback: GatewayCallback,
) -> impl IntoResponse {
    let result = state.reconciliation_engine().process(callback).await;

    let body = match state.gateways.get(provider) {
        Some(adapter) => adapter.acknowledge(&result),
        // No adapter registered for this route; generic rejection.
        None => json!({ "message": "Confirm Fail" }),
    };

    (StatusCode::OK, Json(body))
}
