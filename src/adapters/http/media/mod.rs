//! HTTP adapter for signed media access.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::MediaAppState;
pub use routes::{media_router, media_routes};
