//! HTTP handlers for signed media access.
//!
//! The issue endpoint requires an authenticated, enrolled buyer. The fetch
//! endpoint is gated purely by the token; every invalid token - malformed,
//! expired, or mis-signed - gets the same 403.

use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::media::{IssueMediaTokenCommand, IssueMediaTokenHandler};
use crate::domain::access::MediaTokenService;
use crate::domain::foundation::{BookId, DomainError, ErrorCode};
use crate::ports::EnrollmentStore;

use super::dto::{ErrorResponse, FetchParams, IssueTokenRequest, TokenResponse};
use crate::adapters::http::payments::handlers::AuthenticatedUser;

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared dependencies for the media module.
#[derive(Clone)]
pub struct MediaAppState {
    pub enrollments: Arc<dyn EnrollmentStore>,
    pub tokens: Arc<MediaTokenService>,
    /// TTL stamped into issued tokens.
    pub issue_ttl_secs: u64,
    /// Max age accepted when serving files.
    pub serving_ttl_secs: u64,
}

impl MediaAppState {
    pub fn issue_token_handler(&self) -> IssueMediaTokenHandler {
        IssueMediaTokenHandler::new(
            self.enrollments.clone(),
            self.tokens.clone(),
            self.issue_ttl_secs,
        )
    }
}

/// Maps media-facing errors onto HTTP statuses.
pub struct MediaApiError(DomainError);

impl From<DomainError> for MediaApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for MediaApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.0.code {
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::ValidationFailed | ErrorCode::EmptyField | ErrorCode::InvalidFormat => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Internal error".to_string()
        } else {
            self.0.message.clone()
        };
        (
            status,
            Json(ErrorResponse::new(self.0.code.to_string(), message)),
        )
            .into_response()
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/media/token - Mint a capability token for a protected asset
pub async fn issue_media_token(
    State(state): State<MediaAppState>,
    user: AuthenticatedUser,
    Json(request): Json<IssueTokenRequest>,
) -> Result<impl IntoResponse, MediaApiError> {
    let handler = state.issue_token_handler();
    let cmd = IssueMediaTokenCommand {
        user: user.user_id,
        book: BookId::from_uuid(request.book_id),
        resource: request.resource,
    };

    let issued = handler.handle(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            token: issued.token,
            expires_at: issued.expires_at.as_datetime().to_rfc3339(),
        }),
    ))
}

/// GET /api/media/file/*path - Serve a protected file
///
/// On success, answers with an internal-redirect header for the fronting
/// web server; the file bytes never pass through this process.
pub async fn fetch_media(
    State(state): State<MediaAppState>,
    Path(path): Path<String>,
    Query(params): Query<FetchParams>,
) -> axum::response::Response {
    let max_age = params.expires.min(state.serving_ttl_secs);

    match state.tokens.verify_for(&params.token, &path, max_age) {
        Ok(_) => (
            StatusCode::OK,
            [("x-accel-redirect", format!("/protected/{}", path))],
        )
            .into_response(),
        Err(_) => (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("FORBIDDEN", "Access denied")),
        )
            .into_response(),
    }
}
