//! TransactionLog port - append-only audit trail of gateway callbacks.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrderId};
use crate::domain::payments::TransactionRecord;

/// Port for the callback audit trail.
///
/// One record is appended per callback received, including forged or
/// corrupted ones. Records are never updated or deleted.
#[async_trait]
pub trait TransactionLog: Send + Sync {
    /// Appends an audit record.
    async fn append(&self, record: TransactionRecord) -> Result<TransactionRecord, DomainError>;

    /// Lists the records for one order, oldest first.
    async fn list_for_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Vec<TransactionRecord>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_log_is_object_safe() {
        fn _accepts_dyn(_log: &dyn TransactionLog) {}
    }
}
