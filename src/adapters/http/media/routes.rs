//! Axum router configuration for media endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{fetch_media, issue_media_token, MediaAppState};

/// Create the media API router.
///
/// # Routes
/// - `POST /token` - Mint a capability token (authenticated, enrolled)
/// - `GET /file/*path` - Serve a protected file (token-gated)
pub fn media_routes() -> Router<MediaAppState> {
    Router::new()
        .route("/token", post(issue_media_token))
        .route("/file/*path", get(fetch_media))
}

/// The complete media module router, ready to nest under `/api`.
pub fn media_router() -> Router<MediaAppState> {
    Router::new().nest("/media", media_routes())
}
