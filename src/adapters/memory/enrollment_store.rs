//! In-memory enrollment store with atomic upsert semantics.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::access::Enrollment;
use crate::domain::foundation::{BookId, DomainError, Timestamp, UserId};
use crate::ports::EnrollmentStore;

/// In-memory enrollment store.
///
/// The single mutex makes `grant` atomic, matching the `ON CONFLICT`
/// upsert the PostgreSQL adapter performs.
///
/// # Panics
///
/// Methods panic if the lock is poisoned; test/development use only.
pub struct InMemoryEnrollmentStore {
    entries: Mutex<HashMap<(UserId, BookId), Enrollment>>,
}

impl InMemoryEnrollmentStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Seeds an enrollment directly (for test setup).
    pub fn seed(&self, enrollment: Enrollment) {
        self.entries
            .lock()
            .expect("enrollment store lock poisoned")
            .insert((enrollment.user, enrollment.book), enrollment);
    }

    /// Number of enrollment rows (for test assertions).
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .expect("enrollment store lock poisoned")
            .len()
    }

    /// True when no enrollment exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryEnrollmentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EnrollmentStore for InMemoryEnrollmentStore {
    async fn find(
        &self,
        user: &UserId,
        book: &BookId,
    ) -> Result<Option<Enrollment>, DomainError> {
        Ok(self
            .entries
            .lock()
            .expect("enrollment store lock poisoned")
            .get(&(*user, *book))
            .cloned())
    }

    async fn grant(
        &self,
        user: UserId,
        book: BookId,
        now: Timestamp,
    ) -> Result<Enrollment, DomainError> {
        let mut entries = self.entries.lock().expect("enrollment store lock poisoned");
        let enrollment = entries
            .entry((user, book))
            .and_modify(|existing| {
                if !existing.is_active {
                    existing.reactivate(now);
                }
            })
            .or_insert_with(|| Enrollment::new_active(user, book, now));
        Ok(enrollment.clone())
    }
}
