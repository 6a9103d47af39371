//! HTTP DTOs for media token endpoints.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to mint a capability token for a protected asset.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueTokenRequest {
    /// The book owning the asset.
    pub book_id: Uuid,
    /// Path of the protected resource inside the media store.
    pub resource: String,
}

/// A freshly issued token.
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub token: String,
    /// ISO 8601 expiry of the token.
    pub expires_at: String,
}

/// Query parameters on a protected file fetch: the token plus an explicit
/// max-age in seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchParams {
    pub token: String,
    pub expires: u64,
}

/// Error body returned to API clients.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
