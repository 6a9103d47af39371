//! Error types for order creation and lookup.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Errors raised while creating or fetching orders.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The buyer already holds an active enrollment for this book.
    #[error("Buyer already has access to this book")]
    AlreadyEnrolled,

    /// No order exists for the given reference.
    #[error("Order not found")]
    NotFound,

    /// The order exists but cannot start a checkout (already settled).
    #[error("Order is not payable")]
    NotPayable,

    /// A concurrently created order claimed the same code.
    #[error("Order code collision: {0}")]
    CodeCollision(String),

    /// Field-level validation failed.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The caller does not own the order.
    #[error("Order belongs to a different buyer")]
    Forbidden,

    /// Underlying storage failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<DomainError> for OrderError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::OrderNotFound => OrderError::NotFound,
            ErrorCode::AlreadyEnrolled => OrderError::AlreadyEnrolled,
            ErrorCode::DuplicateOrderCode => OrderError::CodeCollision(err.message),
            ErrorCode::Forbidden => OrderError::Forbidden,
            _ => OrderError::Storage(err.message),
        }
    }
}
