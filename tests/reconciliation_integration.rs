//! End-to-end reconciliation properties, driven through the real VNPay
//! adapter (real canonicalization and HMAC-SHA512) over the in-memory
//! adapters.

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::SecretString;

use bookgate::adapters::events::InMemoryEventBus;
use bookgate::adapters::gateways::VnpayGateway;
use bookgate::adapters::memory::{
    InMemoryEnrollmentStore, InMemoryOrderLedger, InMemoryTransactionLog,
};
use bookgate::config::VnpayConfig;
use bookgate::domain::access::EnrollmentProvisioner;
use bookgate::domain::foundation::{BookId, Timestamp, UserId};
use bookgate::domain::orders::{Order, OrderCode, OrderStatus};
use bookgate::domain::payments::{
    CanonicalProfile, GatewayCallback, GatewayProvider, ReconcileError, ReconcileOutcome,
    ReconciliationEngine, SignatureCodec, SignatureDigest,
};
use bookgate::ports::{GatewayRegistry, OrderLedger, TransactionLog};

const SECRET: &str = "vnpay_integration_secret";

const VNPAY_PROFILE: CanonicalProfile = CanonicalProfile {
    excluded_fields: &["vnp_SecureHash", "vnp_SecureHashType"],
    skip_empty_values: true,
    field_whitelist: None,
};

struct Stack {
    engine: Arc<ReconciliationEngine>,
    ledger: Arc<InMemoryOrderLedger>,
    transactions: Arc<InMemoryTransactionLog>,
    enrollments: Arc<InMemoryEnrollmentStore>,
    events: Arc<InMemoryEventBus>,
}

fn stack() -> Stack {
    let gateway = VnpayGateway::new(&VnpayConfig {
        tmn_code: "BOOKGATE1".to_string(),
        hash_secret: SecretString::new(SECRET.to_string()),
        pay_url: "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html".to_string(),
        return_url: "https://bookgate.example/payment/result".to_string(),
    });

    let ledger = Arc::new(InMemoryOrderLedger::new());
    let transactions = Arc::new(InMemoryTransactionLog::new());
    let enrollments = Arc::new(InMemoryEnrollmentStore::new());
    let events = Arc::new(InMemoryEventBus::new());

    let engine = Arc::new(ReconciliationEngine::new(
        Arc::new(GatewayRegistry::new(vec![Arc::new(gateway)])),
        ledger.clone(),
        transactions.clone(),
        EnrollmentProvisioner::new(enrollments.clone()),
        events.clone(),
    ));

    Stack {
        engine,
        ledger,
        transactions,
        enrollments,
        events,
    }
}

async fn seed_order(stack: &Stack, code: &str, amount: Decimal) -> Order {
    let order = Order::create(
        OrderCode::from_string(code),
        UserId::new(),
        BookId::new(),
        amount,
        "VND",
        GatewayProvider::Vnpay,
        Timestamp::now(),
    )
    .unwrap();
    stack.ledger.insert(order).await.unwrap()
}

/// Builds a VNPay IPN exactly as the gateway would sign it.
fn signed_callback(order_code: &str, amount_x100: &str, response_code: &str) -> GatewayCallback {
    let mut params = BTreeMap::new();
    params.insert("vnp_TxnRef".to_string(), order_code.to_string());
    params.insert("vnp_Amount".to_string(), amount_x100.to_string());
    params.insert("vnp_ResponseCode".to_string(), response_code.to_string());
    params.insert("vnp_TransactionNo".to_string(), "14226112".to_string());
    params.insert("vnp_BankCode".to_string(), "NCB".to_string());
    params.insert("vnp_PayDate".to_string(), "20260101103000".to_string());

    let signature =
        SignatureCodec::sign(&params, SECRET.as_bytes(), SignatureDigest::Sha512, &VNPAY_PROFILE);
    params.insert("vnp_SecureHash".to_string(), signature);

    GatewayCallback::new(GatewayProvider::Vnpay, params)
}

#[tokio::test]
async fn duplicate_callbacks_yield_one_paid_transition_and_one_enrollment() {
    let stack = stack();
    let order = seed_order(&stack, "ORD-20260101-0001", dec!(299000)).await;

    let tasks: Vec<_> = (0..10)
        .map(|_| {
            let engine = stack.engine.clone();
            tokio::spawn(async move {
                engine
                    .process(signed_callback("ORD-20260101-0001", "29900000", "00"))
                    .await
            })
        })
        .collect();

    let mut confirmed = 0;
    for result in futures::future::join_all(tasks).await {
        if let ReconcileOutcome::Confirmed { .. } = result.unwrap().unwrap() {
            confirmed += 1;
        }
    }

    assert_eq!(confirmed, 1, "exactly one callback may apply PAID");
    assert_eq!(stack.enrollments.len(), 1, "exactly one enrollment row");
    assert_eq!(stack.events.event_count(), 1, "one confirmation event");

    let stored = stack.ledger.find_by_id(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Paid);
    // Every delivery leaves an audit record.
    assert_eq!(
        stack
            .transactions
            .list_for_order(&order.id)
            .await
            .unwrap()
            .len(),
        10
    );
}

#[tokio::test]
async fn any_tampered_byte_ends_failed_never_paid() {
    let stack = stack();
    let order = seed_order(&stack, "ORD-20260101-0001", dec!(299000)).await;

    let mut callback = signed_callback("ORD-20260101-0001", "29900000", "00");
    // Flip one byte in a signed field after signing.
    callback
        .params
        .insert("vnp_BankCode".to_string(), "NCC".to_string());

    let result = stack.engine.process(callback).await;

    assert!(matches!(result, Err(ReconcileError::Authenticity)));
    let stored = stack.ledger.find_by_id(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Failed);
    assert!(stack.enrollments.is_empty());

    // The forged payload is retained verbatim for investigation.
    let records = stack.transactions.list_for_order(&order.id).await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(!records[0].signed_ok);
    assert_eq!(records[0].raw_payload["vnp_BankCode"], "NCC");
}

#[tokio::test]
async fn amount_mismatch_after_normalization_ends_failed() {
    let stack = stack();
    let order = seed_order(&stack, "ORD-20260101-0001", dec!(299000)).await;

    // Properly signed callback reporting 298000 VND (29800000 in x100 units).
    let result = stack
        .engine
        .process(signed_callback("ORD-20260101-0001", "29800000", "00"))
        .await;

    assert!(matches!(result, Err(ReconcileError::AmountMismatch)));
    let stored = stack.ledger.find_by_id(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Failed);
    assert!(stack.enrollments.is_empty());
}

#[tokio::test]
async fn unknown_order_reference_is_rejected_with_no_writes() {
    let stack = stack();

    let result = stack
        .engine
        .process(signed_callback("ORD-20260101-4242", "29900000", "00"))
        .await;

    assert!(matches!(result, Err(ReconcileError::OrderNotFound)));
    assert_eq!(stack.transactions.len(), 0);
    assert!(stack.enrollments.is_empty());
    assert_eq!(stack.events.event_count(), 0);
}

#[tokio::test]
async fn identical_redelivery_after_paid_is_a_noop() {
    let stack = stack();
    let order = seed_order(&stack, "ORD-20260101-0001", dec!(299000)).await;
    let callback = signed_callback("ORD-20260101-0001", "29900000", "00");

    let first = stack.engine.process(callback.clone()).await.unwrap();
    let second = stack.engine.process(callback).await.unwrap();

    assert!(matches!(first, ReconcileOutcome::Confirmed { .. }));
    assert!(matches!(second, ReconcileOutcome::AlreadySettled { .. }));

    // No duplicate side effects beyond the audit record.
    assert_eq!(stack.enrollments.len(), 1);
    assert_eq!(stack.events.event_count(), 1);
    assert_eq!(
        stack
            .transactions
            .list_for_order(&order.id)
            .await
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn declined_gateway_result_ends_failed() {
    let stack = stack();
    let order = seed_order(&stack, "ORD-20260101-0001", dec!(299000)).await;

    let result = stack
        .engine
        .process(signed_callback("ORD-20260101-0001", "29900000", "24"))
        .await;

    assert!(matches!(
        result,
        Err(ReconcileError::GatewayDeclined { code }) if code == "24"
    ));
    let stored = stack.ledger.find_by_id(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Failed);
}

#[tokio::test]
async fn forged_then_truthful_interleaving_never_double_provisions() {
    // Whatever order forged and truthful callbacks arrive in, the order
    // settles exactly once and at most one enrollment exists.
    let stack = stack();
    seed_order(&stack, "ORD-20260101-0001", dec!(299000)).await;

    let mut forged = signed_callback("ORD-20260101-0001", "29900000", "00");
    forged
        .params
        .insert("vnp_Amount".to_string(), "99900000".to_string());

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let engine = stack.engine.clone();
            let callback = if i % 2 == 0 {
                forged.clone()
            } else {
                signed_callback("ORD-20260101-0001", "29900000", "00")
            };
            tokio::spawn(async move { engine.process(callback).await })
        })
        .collect();

    let mut confirmed = 0;
    for task in tasks {
        if let Ok(ReconcileOutcome::Confirmed { .. }) = task.await.unwrap() {
            confirmed += 1;
        }
    }

    assert!(confirmed <= 1);
    assert!(stack.enrollments.len() <= 1);
    assert_eq!(stack.events.event_count(), 1);
}
