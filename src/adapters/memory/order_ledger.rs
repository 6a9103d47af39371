//! In-memory OrderLedger with real per-order locking.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId, Timestamp, UserId};
use crate::domain::orders::{Order, OrderCode, OrderStatus};
use crate::ports::{OrderLedger, Transition};

#[derive(Default)]
struct Inner {
    orders: HashMap<OrderId, Arc<Mutex<Order>>>,
    codes: HashMap<OrderCode, OrderId>,
}

/// In-memory ledger.
///
/// Each order sits behind its own async mutex, mirroring the row lock the
/// PostgreSQL adapter takes: transitions on the same order serialize,
/// unrelated orders never wait on each other.
///
/// # Panics
///
/// Methods panic if the index lock is poisoned. Acceptable for test and
/// development use; production runs on the PostgreSQL adapter.
pub struct InMemoryOrderLedger {
    inner: RwLock<Inner>,
}

impl InMemoryOrderLedger {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    fn handle(&self, id: &OrderId) -> Option<Arc<Mutex<Order>>> {
        self.inner
            .read()
            .expect("order index lock poisoned")
            .orders
            .get(id)
            .cloned()
    }
}

impl Default for InMemoryOrderLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderLedger for InMemoryOrderLedger {
    async fn insert(&self, order: Order) -> Result<Order, DomainError> {
        let mut inner = self.inner.write().expect("order index lock poisoned");
        if inner.codes.contains_key(&order.order_code) {
            return Err(DomainError::new(
                ErrorCode::DuplicateOrderCode,
                order.order_code.to_string(),
            ));
        }
        inner.codes.insert(order.order_code.clone(), order.id);
        inner
            .orders
            .insert(order.id, Arc::new(Mutex::new(order.clone())));
        Ok(order)
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        match self.handle(id) {
            Some(handle) => Ok(Some(handle.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn find_by_code(&self, code: &OrderCode) -> Result<Option<Order>, DomainError> {
        let id = self
            .inner
            .read()
            .expect("order index lock poisoned")
            .codes
            .get(code)
            .copied();
        match id {
            Some(id) => self.find_by_id(&id).await,
            None => Ok(None),
        }
    }

    async fn list_for_buyer(
        &self,
        buyer: &UserId,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, DomainError> {
        let handles: Vec<Arc<Mutex<Order>>> = self
            .inner
            .read()
            .expect("order index lock poisoned")
            .orders
            .values()
            .cloned()
            .collect();

        let mut orders = Vec::new();
        for handle in handles {
            let order = handle.lock().await.clone();
            if &order.buyer == buyer && status.map_or(true, |s| order.status == s) {
                orders.push(order);
            }
        }
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn transition(
        &self,
        id: &OrderId,
        target: OrderStatus,
    ) -> Result<Transition, DomainError> {
        let handle = self
            .handle(id)
            .ok_or_else(|| DomainError::new(ErrorCode::OrderNotFound, id.to_string()))?;

        // Exclusive per-order lock around the read-decide-write sequence.
        let mut order = handle.lock().await;

        if order.status.is_settled() {
            return Ok(Transition {
                order: order.clone(),
                applied: false,
            });
        }

        order
            .settle(target, Timestamp::now())
            .map_err(|err| DomainError::new(ErrorCode::InvalidStateTransition, err.to_string()))?;

        Ok(Transition {
            order: order.clone(),
            applied: true,
        })
    }
}
