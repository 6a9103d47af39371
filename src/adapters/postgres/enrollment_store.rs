//! PostgreSQL implementation of EnrollmentStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::access::Enrollment;
use crate::domain::foundation::{BookId, DomainError, Timestamp, UserId};
use crate::ports::EnrollmentStore;

/// PostgreSQL implementation of the EnrollmentStore port.
///
/// `grant` relies on the `(user_id, book_id)` uniqueness constraint with
/// `ON CONFLICT`: an active row is returned untouched, an inactive row is
/// reactivated from now, and a missing row is created - atomically, so a
/// second row can never appear under concurrent grants.
pub struct PostgresEnrollmentStore {
    pool: PgPool,
}

impl PostgresEnrollmentStore {
    /// Creates a new store backed by the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EnrollmentRow {
    user_id: Uuid,
    book_id: Uuid,
    active_from: DateTime<Utc>,
    active_until: Option<DateTime<Utc>>,
    is_active: bool,
}

impl From<EnrollmentRow> for Enrollment {
    fn from(row: EnrollmentRow) -> Self {
        Enrollment {
            user: UserId::from_uuid(row.user_id),
            book: BookId::from_uuid(row.book_id),
            active_from: Timestamp::from_datetime(row.active_from),
            active_until: row.active_until.map(Timestamp::from_datetime),
            is_active: row.is_active,
        }
    }
}

#[async_trait]
impl EnrollmentStore for PostgresEnrollmentStore {
    async fn find(
        &self,
        user: &UserId,
        book: &BookId,
    ) -> Result<Option<Enrollment>, DomainError> {
        let row: Option<EnrollmentRow> = sqlx::query_as(
            r#"
            SELECT user_id, book_id, active_from, active_until, is_active
            FROM enrollments
            WHERE user_id = $1 AND book_id = $2
            "#,
        )
        .bind(user.as_uuid())
        .bind(book.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| DomainError::database(format!("Failed to fetch enrollment: {}", err)))?;

        Ok(row.map(Enrollment::from))
    }

    async fn grant(
        &self,
        user: UserId,
        book: BookId,
        now: Timestamp,
    ) -> Result<Enrollment, DomainError> {
        let row: EnrollmentRow = sqlx::query_as(
            r#"
            INSERT INTO enrollments (user_id, book_id, active_from, active_until, is_active)
            VALUES ($1, $2, $3, NULL, TRUE)
            ON CONFLICT (user_id, book_id) DO UPDATE SET
                is_active = TRUE,
                active_from = CASE
                    WHEN enrollments.is_active THEN enrollments.active_from
                    ELSE EXCLUDED.active_from
                END,
                active_until = CASE
                    WHEN enrollments.is_active THEN enrollments.active_until
                    ELSE NULL
                END
            RETURNING user_id, book_id, active_from, active_until, is_active
            "#,
        )
        .bind(user.as_uuid())
        .bind(book.as_uuid())
        .bind(now.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| DomainError::database(format!("Failed to grant enrollment: {}", err)))?;

        Ok(Enrollment::from(row))
    }
}
