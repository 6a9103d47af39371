//! Reconciliation engine - the single entry point for "a gateway says a
//! payment happened".
//!
//! Protocol, per inbound callback:
//! 1. Select the gateway adapter from the callback's provider tag.
//! 2. Recompute the signature over the raw payload.
//! 3. Resolve the referenced order; unknown references fail fast with no
//!    writes.
//! 4. Append an audit record - even for forged callbacks.
//! 5. Check signature, normalized amount, and the gateway's own result
//!    code; any failure settles the order FAILED.
//! 6. Settle PAID under the ledger's per-order lock; only the call that
//!    actually applied the transition provisions access and emits the
//!    confirmation event.
//!
//! Two duplicate callbacks racing through this protocol serialize inside
//! `OrderLedger::transition`; exactly one observes `applied` and grants
//! enrollment. There is no application-level deduplication table.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::access::EnrollmentProvisioner;
use crate::domain::foundation::{EventId, SerializableDomainEvent, Timestamp};
use crate::domain::orders::{Order, OrderStatus};
use crate::ports::{EventPublisher, GatewayRegistry, OrderLedger, TransactionLog};

use super::{
    CallbackFacts, GatewayCallback, GatewayOutcome, PaymentConfirmed, PaymentRejected,
    ReconcileError, TransactionRecord, TransactionStatus,
};

/// How a callback was absorbed.
#[derive(Debug, Clone)]
pub enum ReconcileOutcome {
    /// All checks passed and this call settled the order PAID.
    ///
    /// `provisioned` is false when the enrollment write failed after the
    /// PAID status was already durable - the payment stands and the gap is
    /// alerted for manual reconciliation.
    Confirmed { order: Order, provisioned: bool },

    /// The order was already settled; nothing changed beyond the audit
    /// record. Redelivery lands here.
    AlreadySettled { order: Order },
}

/// Drives gateway callbacks through verification, reconciliation, and
/// access provisioning.
pub struct ReconciliationEngine {
    gateways: Arc<GatewayRegistry>,
    ledger: Arc<dyn OrderLedger>,
    transactions: Arc<dyn TransactionLog>,
    provisioner: EnrollmentProvisioner,
    events: Arc<dyn EventPublisher>,
}

impl ReconciliationEngine {
    pub fn new(
        gateways: Arc<GatewayRegistry>,
        ledger: Arc<dyn OrderLedger>,
        transactions: Arc<dyn TransactionLog>,
        provisioner: EnrollmentProvisioner,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            gateways,
            ledger,
            transactions,
            provisioner,
            events,
        }
    }

    /// Processes one inbound callback.
    ///
    /// # Errors
    ///
    /// Every rejection is a `ReconcileError`; the HTTP adapters translate
    /// them into provider-native acknowledgments without echoing internals.
    pub async fn process(
        &self,
        callback: GatewayCallback,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let adapter = self
            .gateways
            .get(callback.provider)
            .ok_or(ReconcileError::UnknownProvider)?;

        let signed_ok = adapter.verify(&callback.params);
        let facts = adapter.extract(&callback.params)?;

        let order = self
            .ledger
            .find_by_code(&facts.order_code)
            .await?
            .ok_or(ReconcileError::OrderNotFound)?;

        let now = Timestamp::now();
        self.append_audit(&order, &callback, &facts, signed_ok, now)
            .await?;

        if !signed_ok {
            warn!(
                order_id = %order.id,
                provider = %callback.provider,
                "callback failed signature verification"
            );
            self.settle_failed(&order, "signature verification failed", now)
                .await?;
            return Err(ReconcileError::Authenticity);
        }

        // Unit normalization is allowed now - and only now - that the raw
        // bytes have verified.
        let paid_amount = adapter.paid_amount(&callback.params)?;
        if paid_amount != order.amount {
            warn!(
                order_id = %order.id,
                expected = %order.amount,
                reported = %paid_amount,
                "callback amount does not match order"
            );
            self.settle_failed(&order, "amount mismatch", now).await?;
            return Err(ReconcileError::AmountMismatch);
        }

        if let GatewayOutcome::Declined { code } = &facts.outcome {
            self.settle_failed(&order, "gateway declined", now).await?;
            return Err(ReconcileError::GatewayDeclined { code: code.clone() });
        }

        let transition = self.ledger.transition(&order.id, OrderStatus::Paid).await?;
        if !transition.applied {
            info!(
                order_id = %order.id,
                status = ?transition.order.status,
                "callback redelivered for settled order; no-op"
            );
            return Ok(ReconcileOutcome::AlreadySettled {
                order: transition.order,
            });
        }

        let order = transition.order;
        info!(
            order_id = %order.id,
            order_code = %order.order_code,
            provider = %order.provider,
            "payment confirmed"
        );

        // The order is durably PAID; a provisioning failure past this point
        // is an operational incident, never a rollback.
        let provisioned = match self.provisioner.grant(order.buyer, order.book, now).await {
            Ok(_) => true,
            Err(err) => {
                error!(
                    order_id = %order.id,
                    buyer = %order.buyer,
                    book = %order.book,
                    error = %err,
                    "enrollment provisioning failed after PAID; manual reconciliation required"
                );
                false
            }
        };

        self.emit_confirmed(&order, now).await;

        Ok(ReconcileOutcome::Confirmed { order, provisioned })
    }

    async fn append_audit(
        &self,
        order: &Order,
        callback: &GatewayCallback,
        facts: &CallbackFacts,
        signed_ok: bool,
        now: Timestamp,
    ) -> Result<(), ReconcileError> {
        let status = match facts.outcome {
            GatewayOutcome::Success => TransactionStatus::Success,
            GatewayOutcome::Declined { .. } => TransactionStatus::Failed,
        };
        let record = TransactionRecord::record(
            order.id,
            facts.provider_txn_id.clone(),
            status,
            callback.raw_json(),
            signed_ok,
            now,
        );
        self.transactions.append(record).await?;
        Ok(())
    }

    /// Settles the order FAILED; a no-op when it is already terminal, so a
    /// forged callback can never disturb an order that already paid.
    async fn settle_failed(
        &self,
        order: &Order,
        reason: &str,
        now: Timestamp,
    ) -> Result<(), ReconcileError> {
        let transition = self
            .ledger
            .transition(&order.id, OrderStatus::Failed)
            .await?;
        if transition.applied {
            let event = PaymentRejected {
                event_id: EventId::new(),
                order_id: order.id,
                order_code: order.order_code.clone(),
                provider: order.provider,
                reason: reason.to_string(),
                occurred_at: now,
            };
            if let Err(err) = self.events.publish(event.to_envelope()).await {
                warn!(order_id = %order.id, error = %err, "failed to publish rejection event");
            }
        }
        Ok(())
    }

    /// Fire-and-forget: confirmation is already durable, so a publish
    /// failure is logged rather than propagated.
    async fn emit_confirmed(&self, order: &Order, now: Timestamp) {
        let event = PaymentConfirmed {
            event_id: EventId::new(),
            order_id: order.id,
            order_code: order.order_code.clone(),
            buyer: order.buyer,
            book: order.book,
            amount: order.amount,
            currency: order.currency.clone(),
            provider: order.provider,
            confirmed_at: now,
        };
        if let Err(err) = self.events.publish(event.to_envelope()).await {
            warn!(order_id = %order.id, error = %err, "failed to publish confirmation event");
        }
    }
}
