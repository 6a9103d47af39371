//! ListOrdersHandler - Query handler for a buyer's order history.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::orders::{Order, OrderError, OrderStatus};
use crate::ports::OrderLedger;

/// Query for a buyer's orders.
#[derive(Debug, Clone)]
pub struct ListOrdersQuery {
    pub buyer: UserId,
    pub status: Option<OrderStatus>,
}

/// Handler returning a buyer's orders, newest first.
pub struct ListOrdersHandler {
    ledger: Arc<dyn OrderLedger>,
}

impl ListOrdersHandler {
    pub fn new(ledger: Arc<dyn OrderLedger>) -> Self {
        Self { ledger }
    }

    pub async fn handle(&self, query: ListOrdersQuery) -> Result<Vec<Order>, OrderError> {
        Ok(self
            .ledger
            .list_for_buyer(&query.buyer, query.status)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::adapters::memory::InMemoryOrderLedger;
    use crate::domain::foundation::{BookId, Timestamp};
    use crate::domain::orders::OrderCode;
    use crate::domain::payments::GatewayProvider;

    async fn seed(ledger: &InMemoryOrderLedger, code: &str, buyer: UserId) -> Order {
        let order = Order::create(
            OrderCode::from_string(code),
            buyer,
            BookId::new(),
            dec!(100000),
            "VND",
            GatewayProvider::Momo,
            Timestamp::now(),
        )
        .unwrap();
        ledger.insert(order).await.unwrap()
    }

    #[tokio::test]
    async fn returns_only_the_buyers_orders() {
        let ledger = Arc::new(InMemoryOrderLedger::new());
        let buyer = UserId::new();
        seed(&ledger, "ORD-20260101-0001", buyer).await;
        seed(&ledger, "ORD-20260101-0002", UserId::new()).await;

        let orders = ListOrdersHandler::new(ledger)
            .handle(ListOrdersQuery {
                buyer,
                status: None,
            })
            .await
            .unwrap();

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].buyer, buyer);
    }

    #[tokio::test]
    async fn filters_by_status() {
        let ledger = Arc::new(InMemoryOrderLedger::new());
        let buyer = UserId::new();
        let order = seed(&ledger, "ORD-20260101-0001", buyer).await;
        seed(&ledger, "ORD-20260101-0002", buyer).await;
        ledger.transition(&order.id, OrderStatus::Paid).await.unwrap();

        let paid = ListOrdersHandler::new(ledger)
            .handle(ListOrdersQuery {
                buyer,
                status: Some(OrderStatus::Paid),
            })
            .await
            .unwrap();

        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].id, order.id);
    }
}
