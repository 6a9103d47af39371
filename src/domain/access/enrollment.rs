//! Enrollment entity and the idempotent provisioner.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BookId, DomainError, Timestamp, UserId};
use crate::ports::EnrollmentStore;

/// Grants one buyer access to one book. At most one row per (user, book).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub user: UserId,
    pub book: BookId,
    pub active_from: Timestamp,
    pub active_until: Option<Timestamp>,
    pub is_active: bool,
}

impl Enrollment {
    /// Creates a fresh, open-ended active enrollment.
    pub fn new_active(user: UserId, book: BookId, now: Timestamp) -> Self {
        Self {
            user,
            book,
            active_from: now,
            active_until: None,
            is_active: true,
        }
    }

    /// Whether this enrollment grants access right now.
    ///
    /// Expiry is a query-time predicate, not an event: wall-clock time
    /// elapses with no corresponding write, so `active_until` must be
    /// checked on every read.
    pub fn grants_access(&self, now: Timestamp) -> bool {
        self.is_active
            && self
                .active_until
                .map_or(true, |until| now.is_before(&until))
    }

    /// Reactivates a lapsed enrollment from `now`, clearing any old window.
    pub fn reactivate(&mut self, now: Timestamp) {
        self.is_active = true;
        self.active_from = now;
        self.active_until = None;
    }
}

/// Idempotently grants or reactivates a buyer's access to a book after a
/// confirmed payment.
#[derive(Clone)]
pub struct EnrollmentProvisioner {
    store: Arc<dyn EnrollmentStore>,
}

impl EnrollmentProvisioner {
    pub fn new(store: Arc<dyn EnrollmentStore>) -> Self {
        Self { store }
    }

    /// Grants access. Safe to call any number of times for the same pair:
    /// the store upserts atomically and never creates a second row.
    pub async fn grant(
        &self,
        user: UserId,
        book: BookId,
        now: Timestamp,
    ) -> Result<Enrollment, DomainError> {
        self.store.grant(user, book, now).await
    }

    /// Whether the buyer currently has access to the book.
    pub async fn has_active(
        &self,
        user: &UserId,
        book: &BookId,
        now: Timestamp,
    ) -> Result<bool, DomainError> {
        Ok(self
            .store
            .find(user, book)
            .await?
            .map_or(false, |enrollment| enrollment.grants_access(now)))
    }
}
