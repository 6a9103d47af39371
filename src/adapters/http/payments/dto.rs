//! HTTP DTOs for order and checkout endpoints.
//!
//! These types define the JSON request/response structure of the payments
//! API - the boundary between HTTP and the application layer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::orders::{Order, OrderStatus};
use crate::domain::payments::GatewayProvider;
use crate::ports::CheckoutIntent;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to create a purchase order.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    /// The book being purchased.
    pub book_id: Uuid,
    /// Price determined by the catalog.
    pub amount: Decimal,
    /// ISO currency code; defaults to VND.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Which gateway will collect the payment.
    pub provider: GatewayProvider,
}

fn default_currency() -> String {
    "VND".to_string()
}

/// Query parameters for listing orders.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListOrdersParams {
    /// Optional status filter.
    pub status: Option<OrderStatus>,
}

/// Request to start a gateway payment for an order.
#[derive(Debug, Clone, Deserialize)]
pub struct BeginCheckoutRequest {
    /// The order to pay.
    pub order_id: Uuid,
    /// Where the gateway sends the buyer afterwards.
    pub return_url: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// One order in API form.
#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub order_code: String,
    pub book_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub provider: GatewayProvider,
    pub status: OrderStatus,
    /// ISO 8601, present once the order is paid.
    pub paid_at: Option<String>,
    /// ISO 8601.
    pub created_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.to_string(),
            order_code: order.order_code.to_string(),
            book_id: order.book.to_string(),
            amount: order.amount,
            currency: order.currency,
            provider: order.provider,
            status: order.status,
            paid_at: order.paid_at.map(|t| t.as_datetime().to_rfc3339()),
            created_at: order.created_at.as_datetime().to_rfc3339(),
        }
    }
}

/// A buyer's order history.
#[derive(Debug, Clone, Serialize)]
pub struct OrdersResponse {
    pub orders: Vec<OrderResponse>,
}

/// Provider-specific payment entry points.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    /// Hosted payment page (VNPay).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    /// Wallet payment page (MoMo).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pay_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deeplink: Option<String>,
}

impl From<CheckoutIntent> for CheckoutResponse {
    fn from(intent: CheckoutIntent) -> Self {
        match intent {
            CheckoutIntent::Redirect { url } => Self {
                payment_url: Some(url),
                pay_url: None,
                qr_code_url: None,
                deeplink: None,
            },
            CheckoutIntent::Wallet {
                pay_url,
                qr_code_url,
                deeplink,
            } => Self {
                payment_url: None,
                pay_url: Some(pay_url),
                qr_code_url,
                deeplink,
            },
        }
    }
}

/// Error body returned to API clients.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{BookId, Timestamp, UserId};
    use crate::domain::orders::OrderCode;
    use rust_decimal_macros::dec;

    #[test]
    fn order_response_carries_paid_at_only_when_paid() {
        let mut order = Order::create(
            OrderCode::from_string("ORD-20260101-0001"),
            UserId::new(),
            BookId::new(),
            dec!(299000),
            "VND",
            GatewayProvider::Vnpay,
            Timestamp::now(),
        )
        .unwrap();

        let pending = OrderResponse::from(order.clone());
        assert!(pending.paid_at.is_none());

        order.settle(OrderStatus::Paid, Timestamp::now()).unwrap();
        let paid = OrderResponse::from(order);
        assert!(paid.paid_at.is_some());
    }

    #[test]
    fn redirect_intent_serializes_only_payment_url() {
        let response = CheckoutResponse::from(CheckoutIntent::Redirect {
            url: "https://pay.example/x".to_string(),
        });
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["payment_url"], "https://pay.example/x");
        assert!(json.get("pay_url").is_none());
    }

    #[test]
    fn wallet_intent_serializes_wallet_fields() {
        let response = CheckoutResponse::from(CheckoutIntent::Wallet {
            pay_url: "https://momo.example/pay".to_string(),
            qr_code_url: Some("https://momo.example/qr".to_string()),
            deeplink: None,
        });
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["pay_url"], "https://momo.example/pay");
        assert_eq!(json["qr_code_url"], "https://momo.example/qr");
        assert!(json.get("payment_url").is_none());
        assert!(json.get("deeplink").is_none());
    }

    #[test]
    fn create_order_request_defaults_currency_to_vnd() {
        let request: CreateOrderRequest = serde_json::from_value(serde_json::json!({
            "book_id": "7f6b2c3a-1111-2222-3333-444455556666",
            "amount": "299000",
            "provider": "vnpay"
        }))
        .unwrap();
        assert_eq!(request.currency, "VND");
    }
}
