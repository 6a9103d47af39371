//! Payment checkout use cases.

mod begin_checkout;

pub use begin_checkout::{BeginCheckoutCommand, BeginCheckoutHandler};
