//! PostgreSQL implementation of OrderLedger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId, Timestamp, UserId};
use crate::domain::orders::{Order, OrderCode, OrderStatus};
use crate::domain::payments::GatewayProvider;
use crate::ports::{OrderLedger, Transition};

/// PostgreSQL implementation of the OrderLedger port.
///
/// Settlement transitions run inside a transaction holding a
/// `SELECT ... FOR UPDATE` row lock, so the read-decide-write sequence is
/// exclusive per order while unrelated orders proceed untouched.
pub struct PostgresOrderLedger {
    pool: PgPool,
}

impl PostgresOrderLedger {
    /// Creates a new ledger backed by the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of an order.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    order_code: String,
    buyer_id: Uuid,
    book_id: Uuid,
    amount: Decimal,
    currency: String,
    provider: String,
    status: String,
    paid_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: OrderId::from_uuid(row.id),
            order_code: OrderCode::from_string(row.order_code),
            buyer: UserId::from_uuid(row.buyer_id),
            book: crate::domain::foundation::BookId::from_uuid(row.book_id),
            amount: row.amount,
            currency: row.currency,
            provider: parse_provider(&row.provider)?,
            status: parse_status(&row.status)?,
            paid_at: row.paid_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn parse_provider(s: &str) -> Result<GatewayProvider, DomainError> {
    s.parse()
        .map_err(|_| DomainError::database(format!("Invalid provider value: {}", s)))
}

fn parse_status(s: &str) -> Result<OrderStatus, DomainError> {
    match s {
        "pending" => Ok(OrderStatus::Pending),
        "paid" => Ok(OrderStatus::Paid),
        "failed" => Ok(OrderStatus::Failed),
        "cancelled" => Ok(OrderStatus::Cancelled),
        _ => Err(DomainError::database(format!("Invalid status value: {}", s))),
    }
}

fn status_to_str(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "pending",
        OrderStatus::Paid => "paid",
        OrderStatus::Failed => "failed",
        OrderStatus::Cancelled => "cancelled",
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl OrderLedger for PostgresOrderLedger {
    async fn insert(&self, order: Order) -> Result<Order, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_code, buyer_id, book_id, amount, currency,
                provider, status, paid_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.order_code.as_str())
        .bind(order.buyer.as_uuid())
        .bind(order.book.as_uuid())
        .bind(order.amount)
        .bind(&order.currency)
        .bind(order.provider.as_str())
        .bind(status_to_str(order.status))
        .bind(order.paid_at.map(|t| *t.as_datetime()))
        .bind(order.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                DomainError::new(ErrorCode::DuplicateOrderCode, order.order_code.to_string())
            } else {
                DomainError::database(format!("Failed to insert order: {}", err))
            }
        })?;

        Ok(order)
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, order_code, buyer_id, book_id, amount, currency,
                   provider, status, paid_at, created_at
            FROM orders WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| DomainError::database(format!("Failed to fetch order: {}", err)))?;

        row.map(Order::try_from).transpose()
    }

    async fn find_by_code(&self, code: &OrderCode) -> Result<Option<Order>, DomainError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, order_code, buyer_id, book_id, amount, currency,
                   provider, status, paid_at, created_at
            FROM orders WHERE order_code = $1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| DomainError::database(format!("Failed to fetch order: {}", err)))?;

        row.map(Order::try_from).transpose()
    }

    async fn list_for_buyer(
        &self,
        buyer: &UserId,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, DomainError> {
        let rows: Vec<OrderRow> = match status {
            Some(status) => {
                sqlx::query_as(
                    r#"
                    SELECT id, order_code, buyer_id, book_id, amount, currency,
                           provider, status, paid_at, created_at
                    FROM orders
                    WHERE buyer_id = $1 AND status = $2
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(buyer.as_uuid())
                .bind(status_to_str(status))
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT id, order_code, buyer_id, book_id, amount, currency,
                           provider, status, paid_at, created_at
                    FROM orders
                    WHERE buyer_id = $1
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(buyer.as_uuid())
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|err| DomainError::database(format!("Failed to list orders: {}", err)))?;

        rows.into_iter().map(Order::try_from).collect()
    }

    async fn transition(
        &self,
        id: &OrderId,
        target: OrderStatus,
    ) -> Result<Transition, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| DomainError::database(format!("Failed to open transaction: {}", err)))?;

        // Exclusive row lock for the whole read-decide-write sequence.
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, order_code, buyer_id, book_id, amount, currency,
                   provider, status, paid_at, created_at
            FROM orders WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|err| DomainError::database(format!("Failed to lock order: {}", err)))?;

        let mut order = row
            .map(Order::try_from)
            .transpose()?
            .ok_or_else(|| DomainError::new(ErrorCode::OrderNotFound, id.to_string()))?;

        if order.status.is_settled() {
            tx.rollback()
                .await
                .map_err(|err| DomainError::database(format!("Failed to rollback: {}", err)))?;
            return Ok(Transition {
                order,
                applied: false,
            });
        }

        order.settle(target, Timestamp::now()).map_err(|err| {
            DomainError::new(ErrorCode::InvalidStateTransition, err.to_string())
        })?;

        sqlx::query("UPDATE orders SET status = $2, paid_at = $3 WHERE id = $1")
            .bind(order.id.as_uuid())
            .bind(status_to_str(order.status))
            .bind(order.paid_at.map(|t| *t.as_datetime()))
            .execute(&mut *tx)
            .await
            .map_err(|err| DomainError::database(format!("Failed to update order: {}", err)))?;

        tx.commit()
            .await
            .map_err(|err| DomainError::database(format!("Failed to commit: {}", err)))?;

        Ok(Transition {
            order,
            applied: true,
        })
    }
}
