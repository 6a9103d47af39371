//! PostgreSQL adapters.
//!
//! Implement the persistence ports with sqlx. The order ledger takes a
//! `SELECT ... FOR UPDATE` row lock for settlement transitions; the
//! enrollment store upserts with `ON CONFLICT` so concurrent grants can
//! never produce a second row.

mod enrollment_store;
mod order_ledger;
mod transaction_log;

pub use enrollment_store::PostgresEnrollmentStore;
pub use order_ledger::PostgresOrderLedger;
pub use transaction_log::PostgresTransactionLog;
