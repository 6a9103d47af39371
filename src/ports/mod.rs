//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `OrderLedger` - order persistence and the locked settlement transition
//! - `TransactionLog` - append-only audit trail of gateway callbacks
//! - `EnrollmentStore` - idempotent content-access grants
//! - `GatewayAdapter` / `GatewayRegistry` - per-provider gateway capability set
//! - `EventPublisher` - outbound domain events for async workers

mod enrollment_store;
mod event_publisher;
mod gateway_adapter;
mod order_ledger;
mod transaction_log;

pub use enrollment_store::EnrollmentStore;
pub use event_publisher::EventPublisher;
pub use gateway_adapter::{
    CheckoutContext, CheckoutIntent, GatewayAdapter, GatewayRegistry,
};
pub use order_ledger::{OrderLedger, Transition};
pub use transaction_log::TransactionLog;
