//! Bookgate - Payment confirmation and content access for a paid-content book platform.
//!
//! This crate reconciles untrusted payment-gateway callbacks (VNPay, MoMo)
//! against internally created orders, transitions order state exactly once
//! under concurrent delivery, and provisions book access for the buyer.
//! It also issues short-lived signed capability tokens for protected media.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
