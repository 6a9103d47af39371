//! PostgreSQL implementation of TransactionLog.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, OrderId, Timestamp, TransactionId};
use crate::domain::payments::{TransactionRecord, TransactionStatus};
use crate::ports::TransactionLog;

/// PostgreSQL implementation of the TransactionLog port.
///
/// Insert-only: no update or delete statement exists in this adapter,
/// matching the append-only invariant of the audit trail.
pub struct PostgresTransactionLog {
    pool: PgPool,
}

impl PostgresTransactionLog {
    /// Creates a new log backed by the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    order_id: Uuid,
    provider_txn_id: Option<String>,
    status: String,
    raw_payload: serde_json::Value,
    signed_ok: bool,
    ipn_verified: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for TransactionRecord {
    type Error = DomainError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(TransactionRecord {
            id: TransactionId::from_uuid(row.id),
            order_id: OrderId::from_uuid(row.order_id),
            provider_txn_id: row.provider_txn_id,
            status: parse_status(&row.status)?,
            raw_payload: row.raw_payload,
            signed_ok: row.signed_ok,
            ipn_verified: row.ipn_verified,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn parse_status(s: &str) -> Result<TransactionStatus, DomainError> {
    match s {
        "success" => Ok(TransactionStatus::Success),
        "failed" => Ok(TransactionStatus::Failed),
        "pending" => Ok(TransactionStatus::Pending),
        _ => Err(DomainError::database(format!(
            "Invalid transaction status: {}",
            s
        ))),
    }
}

fn status_to_str(status: TransactionStatus) -> &'static str {
    match status {
        TransactionStatus::Success => "success",
        TransactionStatus::Failed => "failed",
        TransactionStatus::Pending => "pending",
    }
}

#[async_trait]
impl TransactionLog for PostgresTransactionLog {
    async fn append(&self, record: TransactionRecord) -> Result<TransactionRecord, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, order_id, provider_txn_id, status, raw_payload,
                signed_ok, ipn_verified, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.order_id.as_uuid())
        .bind(&record.provider_txn_id)
        .bind(status_to_str(record.status))
        .bind(&record.raw_payload)
        .bind(record.signed_ok)
        .bind(record.ipn_verified)
        .bind(record.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|err| DomainError::database(format!("Failed to append transaction: {}", err)))?;

        Ok(record)
    }

    async fn list_for_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Vec<TransactionRecord>, DomainError> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, order_id, provider_txn_id, status, raw_payload,
                   signed_ok, ipn_verified, created_at
            FROM transactions
            WHERE order_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|err| DomainError::database(format!("Failed to list transactions: {}", err)))?;

        rows.into_iter().map(TransactionRecord::try_from).collect()
    }
}
