//! BeginCheckoutHandler - Command handler for starting a gateway payment.

use std::sync::Arc;

use crate::domain::foundation::{OrderId, UserId};
use crate::domain::orders::OrderError;
use crate::ports::{CheckoutContext, CheckoutIntent, GatewayRegistry, OrderLedger};

/// Command to start a payment for an existing pending order.
#[derive(Debug, Clone)]
pub struct BeginCheckoutCommand {
    pub buyer: UserId,
    pub order_id: OrderId,
    pub return_url: String,
    pub client_ip: String,
}

/// Handler that hands a pending order to its gateway adapter.
pub struct BeginCheckoutHandler {
    ledger: Arc<dyn OrderLedger>,
    gateways: Arc<GatewayRegistry>,
}

impl BeginCheckoutHandler {
    pub fn new(ledger: Arc<dyn OrderLedger>, gateways: Arc<GatewayRegistry>) -> Self {
        Self { ledger, gateways }
    }

    /// Builds the provider-specific payment redirect/QR for the order.
    ///
    /// # Errors
    ///
    /// - `OrderError::NotFound` for unknown orders.
    /// - `OrderError::Forbidden` when the caller does not own the order.
    /// - `OrderError::NotPayable` when the order has already settled.
    pub async fn handle(&self, cmd: BeginCheckoutCommand) -> Result<CheckoutIntent, OrderError> {
        let order = self
            .ledger
            .find_by_id(&cmd.order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        if order.buyer != cmd.buyer {
            return Err(OrderError::Forbidden);
        }
        if !order.is_pending() {
            return Err(OrderError::NotPayable);
        }

        let adapter = self
            .gateways
            .get(order.provider)
            .ok_or_else(|| OrderError::Storage(format!("no adapter for {}", order.provider)))?;

        let ctx = CheckoutContext {
            client_ip: cmd.client_ip,
            return_url: cmd.return_url,
        };
        Ok(adapter.begin_checkout(&order, &ctx).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use secrecy::SecretString;

    use crate::adapters::gateways::VnpayGateway;
    use crate::adapters::memory::InMemoryOrderLedger;
    use crate::config::VnpayConfig;
    use crate::domain::foundation::{BookId, Timestamp};
    use crate::domain::orders::{Order, OrderCode, OrderStatus};
    use crate::domain::payments::GatewayProvider;

    fn registry() -> Arc<GatewayRegistry> {
        let vnpay = VnpayGateway::new(&VnpayConfig {
            tmn_code: "BOOKGATE1".to_string(),
            hash_secret: SecretString::new("secret".to_string()),
            pay_url: "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html".to_string(),
            return_url: "https://bookgate.example/payment/result".to_string(),
        });
        Arc::new(GatewayRegistry::new(vec![Arc::new(vnpay)]))
    }

    async fn seed(ledger: &InMemoryOrderLedger, buyer: UserId) -> Order {
        let order = Order::create(
            OrderCode::from_string("ORD-20260101-0001"),
            buyer,
            BookId::new(),
            dec!(299000),
            "VND",
            GatewayProvider::Vnpay,
            Timestamp::now(),
        )
        .unwrap();
        ledger.insert(order).await.unwrap()
    }

    fn command(buyer: UserId, order_id: OrderId) -> BeginCheckoutCommand {
        BeginCheckoutCommand {
            buyer,
            order_id,
            return_url: "https://bookgate.example/payment/result".to_string(),
            client_ip: "203.0.113.7".to_string(),
        }
    }

    #[tokio::test]
    async fn pending_order_yields_a_redirect() {
        let ledger = Arc::new(InMemoryOrderLedger::new());
        let buyer = UserId::new();
        let order = seed(&ledger, buyer).await;

        let intent = BeginCheckoutHandler::new(ledger, registry())
            .handle(command(buyer, order.id))
            .await
            .unwrap();

        assert!(matches!(intent, CheckoutIntent::Redirect { .. }));
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let ledger = Arc::new(InMemoryOrderLedger::new());

        let result = BeginCheckoutHandler::new(ledger, registry())
            .handle(command(UserId::new(), OrderId::new()))
            .await;

        assert!(matches!(result, Err(OrderError::NotFound)));
    }

    #[tokio::test]
    async fn someone_elses_order_is_forbidden() {
        let ledger = Arc::new(InMemoryOrderLedger::new());
        let order = seed(&ledger, UserId::new()).await;

        let result = BeginCheckoutHandler::new(ledger, registry())
            .handle(command(UserId::new(), order.id))
            .await;

        assert!(matches!(result, Err(OrderError::Forbidden)));
    }

    #[tokio::test]
    async fn settled_order_is_not_payable() {
        let ledger = Arc::new(InMemoryOrderLedger::new());
        let buyer = UserId::new();
        let order = seed(&ledger, buyer).await;
        ledger.transition(&order.id, OrderStatus::Paid).await.unwrap();

        let result = BeginCheckoutHandler::new(ledger, registry())
            .handle(command(buyer, order.id))
            .await;

        assert!(matches!(result, Err(OrderError::NotPayable)));
    }
}
