//! In-memory adapters for tests and local development.
//!
//! These honor the same locking contracts as the PostgreSQL adapters -
//! per-order exclusive transitions, atomic enrollment upserts - so the
//! concurrency properties of the reconciliation protocol can be exercised
//! without a database.

mod enrollment_store;
mod order_ledger;
mod transaction_log;

pub use enrollment_store::InMemoryEnrollmentStore;
pub use order_ledger::InMemoryOrderLedger;
pub use transaction_log::InMemoryTransactionLog;
