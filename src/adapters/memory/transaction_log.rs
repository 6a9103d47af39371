//! In-memory append-only transaction log.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrderId};
use crate::domain::payments::TransactionRecord;
use crate::ports::TransactionLog;

/// In-memory audit trail.
///
/// # Panics
///
/// Methods panic if the lock is poisoned; test/development use only.
pub struct InMemoryTransactionLog {
    records: RwLock<Vec<TransactionRecord>>,
}

impl InMemoryTransactionLog {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Total number of records (for test assertions).
    pub fn len(&self) -> usize {
        self.records.read().expect("transaction log lock poisoned").len()
    }

    /// True when no callback has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryTransactionLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransactionLog for InMemoryTransactionLog {
    async fn append(&self, record: TransactionRecord) -> Result<TransactionRecord, DomainError> {
        self.records
            .write()
            .expect("transaction log lock poisoned")
            .push(record.clone());
        Ok(record)
    }

    async fn list_for_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Vec<TransactionRecord>, DomainError> {
        Ok(self
            .records
            .read()
            .expect("transaction log lock poisoned")
            .iter()
            .filter(|record| &record.order_id == order_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;
    use crate::domain::payments::TransactionStatus;
    use serde_json::json;

    fn record(order_id: OrderId, signed_ok: bool) -> TransactionRecord {
        TransactionRecord::record(
            order_id,
            Some("txn-1".to_string()),
            TransactionStatus::Success,
            json!({"k": "v"}),
            signed_ok,
            Timestamp::now(),
        )
    }

    #[tokio::test]
    async fn append_keeps_every_record() {
        let log = InMemoryTransactionLog::new();
        let order_id = OrderId::new();

        log.append(record(order_id, true)).await.unwrap();
        log.append(record(order_id, false)).await.unwrap();

        let records = log.list_for_order(&order_id).await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].signed_ok);
        assert!(!records[1].signed_ok);
    }

    #[tokio::test]
    async fn list_filters_by_order() {
        let log = InMemoryTransactionLog::new();
        let a = OrderId::new();
        let b = OrderId::new();

        log.append(record(a, true)).await.unwrap();
        log.append(record(b, true)).await.unwrap();

        assert_eq!(log.list_for_order(&a).await.unwrap().len(), 1);
        assert_eq!(log.len(), 2);
    }
}
