//! Command and query handlers.
//!
//! Each handler orchestrates ports for one use case. The reconciliation
//! of inbound gateway callbacks lives in
//! `domain::payments::ReconciliationEngine`, invoked directly by the IPN
//! routes.

pub mod media;
pub mod orders;
pub mod payments;
