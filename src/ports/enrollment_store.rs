//! EnrollmentStore port - persistence for content-access grants.

use async_trait::async_trait;

use crate::domain::access::Enrollment;
use crate::domain::foundation::{BookId, DomainError, Timestamp, UserId};

/// Port for enrollment storage.
///
/// At most one row exists per (user, book) pair; `grant` must be an atomic
/// upsert (a uniqueness constraint plus `ON CONFLICT` in PostgreSQL) so
/// concurrent grants can never create a second row.
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    /// Looks up the enrollment for a (user, book) pair.
    async fn find(
        &self,
        user: &UserId,
        book: &BookId,
    ) -> Result<Option<Enrollment>, DomainError>;

    /// Idempotent grant: creates an active enrollment, reactivates an
    /// inactive one with `active_from = now`, or returns the existing
    /// active row unchanged.
    async fn grant(
        &self,
        user: UserId,
        book: BookId,
        now: Timestamp,
    ) -> Result<Enrollment, DomainError>;
}
