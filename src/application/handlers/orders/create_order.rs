//! CreateOrderHandler - Command handler for starting a purchase.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::access::EnrollmentProvisioner;
use crate::domain::foundation::{BookId, ErrorCode, Timestamp, UserId};
use crate::domain::orders::{Order, OrderCodeAllocator, OrderError};
use crate::domain::payments::GatewayProvider;
use crate::ports::{EnrollmentStore, OrderLedger};

/// Allocation retries when another process claimed the same order code.
const MAX_CODE_RETRIES: u32 = 3;

/// Command to create a purchase order.
///
/// The amount comes from the catalog at checkout time and is immutable on
/// the order from then on.
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    pub buyer: UserId,
    pub book: BookId,
    pub amount: Decimal,
    pub currency: String,
    pub provider: GatewayProvider,
}

/// Handler for creating purchase orders.
pub struct CreateOrderHandler {
    ledger: Arc<dyn OrderLedger>,
    enrollments: Arc<dyn EnrollmentStore>,
    allocator: Arc<OrderCodeAllocator>,
}

impl CreateOrderHandler {
    pub fn new(
        ledger: Arc<dyn OrderLedger>,
        enrollments: Arc<dyn EnrollmentStore>,
        allocator: Arc<OrderCodeAllocator>,
    ) -> Self {
        Self {
            ledger,
            enrollments,
            allocator,
        }
    }

    /// Creates a pending order for the buyer.
    ///
    /// # Errors
    ///
    /// - `OrderError::AlreadyEnrolled` when the buyer already holds an
    ///   active enrollment for the book - owned content is not sold twice.
    /// - `OrderError::Validation` on a non-positive amount or empty
    ///   currency.
    /// - `OrderError::CodeCollision` when allocation keeps colliding after
    ///   retries (another process racing the same sequence).
    pub async fn handle(&self, cmd: CreateOrderCommand) -> Result<Order, OrderError> {
        let now = Timestamp::now();

        let provisioner = EnrollmentProvisioner::new(self.enrollments.clone());
        if provisioner.has_active(&cmd.buyer, &cmd.book, now).await? {
            return Err(OrderError::AlreadyEnrolled);
        }

        let mut attempt = 0;
        loop {
            let code = self.allocator.allocate(now);
            let order = Order::create(
                code,
                cmd.buyer,
                cmd.book,
                cmd.amount,
                cmd.currency.clone(),
                cmd.provider,
                now,
            )?;

            match self.ledger.insert(order).await {
                Ok(order) => return Ok(order),
                Err(err) if err.code == ErrorCode::DuplicateOrderCode => {
                    attempt += 1;
                    if attempt >= MAX_CODE_RETRIES {
                        return Err(err.into());
                    }
                    // Another writer claimed this code; take the next one.
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
