//! Payments module - gateway signature verification and order reconciliation.

mod callback;
mod errors;
mod events;
mod provider;
mod reconciliation;
mod signature;
mod transaction;

pub use callback::{CallbackFacts, GatewayCallback, GatewayOutcome};
pub use errors::ReconcileError;
pub use events::{PaymentConfirmed, PaymentRejected};
pub use provider::GatewayProvider;
pub use reconciliation::{ReconcileOutcome, ReconciliationEngine};
pub use signature::{constant_time_eq, CanonicalProfile, SignatureCodec, SignatureDigest};
pub use transaction::{TransactionRecord, TransactionStatus};
