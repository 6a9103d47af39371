//! HTTP adapter for orders, checkout, and gateway IPN endpoints.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::PaymentsAppState;
pub use routes::{ipn_routes, payments_router, payments_routes};
