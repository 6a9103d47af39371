//! VNPay gateway adapter.
//!
//! VNPay signs the full sorted parameter set with HMAC-SHA512, omitting
//! empty values and the signature fields themselves. Amounts travel in
//! smallest-unit form (VND x 100). IPN acknowledgments use VNPay's
//! response-code vocabulary; any definitive code stops redelivery.

use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value as JsonValue};

use crate::config::VnpayConfig;
use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::orders::{Order, OrderCode};
use crate::domain::payments::{
    CallbackFacts, CanonicalProfile, GatewayOutcome, GatewayProvider, ReconcileError,
    ReconcileOutcome, SignatureCodec, SignatureDigest,
};
use crate::ports::{CheckoutContext, CheckoutIntent, GatewayAdapter};

const SIGNATURE_FIELD: &str = "vnp_SecureHash";
const TXN_REF_FIELD: &str = "vnp_TxnRef";
const TXN_NO_FIELD: &str = "vnp_TransactionNo";
const AMOUNT_FIELD: &str = "vnp_Amount";
const RESPONSE_CODE_FIELD: &str = "vnp_ResponseCode";
const SUCCESS_CODE: &str = "00";

/// Empty values and the signature fields never enter the signing string.
const PROFILE: CanonicalProfile = CanonicalProfile {
    excluded_fields: &["vnp_SecureHash", "vnp_SecureHashType"],
    skip_empty_values: true,
    field_whitelist: None,
};

/// VNPay hosted-payment adapter.
pub struct VnpayGateway {
    tmn_code: String,
    hash_secret: SecretString,
    pay_url: String,
}

impl VnpayGateway {
    pub fn new(config: &VnpayConfig) -> Self {
        Self {
            tmn_code: config.tmn_code.clone(),
            hash_secret: config.hash_secret.clone(),
            pay_url: config.pay_url.clone(),
        }
    }

    fn secret_bytes(&self) -> &[u8] {
        self.hash_secret.expose_secret().as_bytes()
    }
}

#[async_trait]
impl GatewayAdapter for VnpayGateway {
    fn provider(&self) -> GatewayProvider {
        GatewayProvider::Vnpay
    }

    fn verify(&self, params: &BTreeMap<String, String>) -> bool {
        let claimed = match params.get(SIGNATURE_FIELD) {
            Some(signature) => signature,
            None => return false,
        };
        SignatureCodec::verify(
            params,
            claimed,
            self.secret_bytes(),
            SignatureDigest::Sha512,
            &PROFILE,
        )
    }

    fn extract(&self, params: &BTreeMap<String, String>) -> Result<CallbackFacts, ReconcileError> {
        let order_code = params
            .get(TXN_REF_FIELD)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ReconcileError::Malformed(TXN_REF_FIELD.to_string()))?;
        let response_code = params
            .get(RESPONSE_CODE_FIELD)
            .ok_or_else(|| ReconcileError::Malformed(RESPONSE_CODE_FIELD.to_string()))?;

        let outcome = if response_code == SUCCESS_CODE {
            GatewayOutcome::Success
        } else {
            GatewayOutcome::Declined {
                code: response_code.clone(),
            }
        };

        Ok(CallbackFacts {
            order_code: OrderCode::from_string(order_code.clone()),
            provider_txn_id: params.get(TXN_NO_FIELD).filter(|v| !v.is_empty()).cloned(),
            outcome,
        })
    }

    fn paid_amount(&self, params: &BTreeMap<String, String>) -> Result<Decimal, ReconcileError> {
        let raw = params
            .get(AMOUNT_FIELD)
            .ok_or_else(|| ReconcileError::Malformed(AMOUNT_FIELD.to_string()))?;
        let scaled: Decimal = raw
            .parse()
            .map_err(|_| ReconcileError::Malformed(AMOUNT_FIELD.to_string()))?;
        // VNPay reports VND x 100; normalize back to currency units.
        Ok(scaled / Decimal::ONE_HUNDRED)
    }

    async fn begin_checkout(
        &self,
        order: &Order,
        ctx: &CheckoutContext,
    ) -> Result<CheckoutIntent, DomainError> {
        let mut params = BTreeMap::new();
        params.insert("vnp_Version".to_string(), "2.1.0".to_string());
        params.insert("vnp_Command".to_string(), "pay".to_string());
        params.insert("vnp_TmnCode".to_string(), self.tmn_code.clone());
        params.insert(
            AMOUNT_FIELD.to_string(),
            (order.amount * Decimal::ONE_HUNDRED).normalize().to_string(),
        );
        params.insert("vnp_CurrCode".to_string(), order.currency.clone());
        params.insert(TXN_REF_FIELD.to_string(), order.order_code.to_string());
        params.insert(
            "vnp_OrderInfo".to_string(),
            format!("Payment for order {}", order.order_code),
        );
        params.insert("vnp_OrderType".to_string(), "billpayment".to_string());
        params.insert("vnp_Locale".to_string(), "vn".to_string());
        params.insert("vnp_ReturnUrl".to_string(), ctx.return_url.clone());
        params.insert("vnp_IpAddr".to_string(), ctx.client_ip.clone());
        params.insert(
            "vnp_CreateDate".to_string(),
            Timestamp::now()
                .as_datetime()
                .format("%Y%m%d%H%M%S")
                .to_string(),
        );

        // The signature covers the raw values; the query string carries
        // their URL-encoded form.
        let signature = SignatureCodec::sign(
            &params,
            self.secret_bytes(),
            SignatureDigest::Sha512,
            &PROFILE,
        );

        let mut query = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &params {
            query.append_pair(key, value);
        }
        query.append_pair(SIGNATURE_FIELD, &signature);

        Ok(CheckoutIntent::Redirect {
            url: format!("{}?{}", self.pay_url, query.finish()),
        })
    }

    fn acknowledge(&self, result: &Result<ReconcileOutcome, ReconcileError>) -> JsonValue {
        let (code, message) = match result {
            Ok(ReconcileOutcome::Confirmed { .. }) => ("00", "Confirm Success"),
            Ok(ReconcileOutcome::AlreadySettled { .. }) => ("02", "Order already confirmed"),
            // A declined payment was still durably recorded; acknowledge it
            // so VNPay stops redelivering.
            Err(ReconcileError::GatewayDeclined { .. }) => ("00", "Confirm Success"),
            Err(ReconcileError::OrderNotFound) => ("01", "Order not found"),
            Err(ReconcileError::AmountMismatch) => ("04", "Invalid amount"),
            Err(ReconcileError::Authenticity) => ("97", "Invalid signature"),
            Err(_) => ("99", "Confirm Fail"),
        };
        json!({ "RspCode": code, "Message": message })
    }
}
