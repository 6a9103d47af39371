//! Payment gateway adapters.
//!
//! One adapter per provider, each implementing the `GatewayAdapter`
//! capability set with its own signing scheme, amount unit, success
//! sentinel, and acknowledgment vocabulary.

mod momo;
mod vnpay;

pub use momo::MomoGateway;
pub use vnpay::VnpayGateway;
