//! IssueMediaTokenHandler - Command handler for signed media access.

use std::sync::Arc;

use crate::domain::access::{EnrollmentProvisioner, MediaTokenService};
use crate::domain::foundation::{BookId, DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::EnrollmentStore;

/// Command to mint a capability token for a protected asset.
#[derive(Debug, Clone)]
pub struct IssueMediaTokenCommand {
    pub user: UserId,
    /// The book owning the asset; access is checked against it.
    pub book: BookId,
    /// Path of the protected resource inside the media store.
    pub resource: String,
}

/// A freshly issued token with its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: Timestamp,
}

/// Handler gating token issuance on an active enrollment.
pub struct IssueMediaTokenHandler {
    enrollments: Arc<dyn EnrollmentStore>,
    tokens: Arc<MediaTokenService>,
    ttl_secs: u64,
}

impl IssueMediaTokenHandler {
    pub fn new(
        enrollments: Arc<dyn EnrollmentStore>,
        tokens: Arc<MediaTokenService>,
        ttl_secs: u64,
    ) -> Self {
        Self {
            enrollments,
            tokens,
            ttl_secs,
        }
    }

    /// Issues a token iff the user holds an active enrollment for the book
    /// right now - the expiry predicate runs at this read, not at grant
    /// time.
    ///
    /// # Errors
    ///
    /// `ErrorCode::Forbidden` when no active enrollment exists.
    pub async fn handle(&self, cmd: IssueMediaTokenCommand) -> Result<IssuedToken, DomainError> {
        let now = Timestamp::now();

        let provisioner = EnrollmentProvisioner::new(self.enrollments.clone());
        if !provisioner.has_active(&cmd.user, &cmd.book, now).await? {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "No active enrollment for this book",
            ));
        }

        let token = self.tokens.issue_at(&cmd.resource, self.ttl_secs, now);
        Ok(IssuedToken {
            token,
            expires_at: now.plus_secs(self.ttl_secs),
        })
    }
}
