//! MoMo gateway adapter.
//!
//! MoMo signs a fixed, documented field list with HMAC-SHA256; missing
//! fields contribute empty values, and the partner's access key joins the
//! signing string even though it never travels in the callback. Amounts
//! are plain VND. Checkout goes through MoMo's create-payment API.

use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use crate::config::MomoConfig;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::orders::{Order, OrderCode};
use crate::domain::payments::{
    CallbackFacts, CanonicalProfile, GatewayOutcome, GatewayProvider, ReconcileError,
    ReconcileOutcome, SignatureCodec, SignatureDigest,
};
use crate::ports::{CheckoutContext, CheckoutIntent, GatewayAdapter};

const SIGNATURE_FIELD: &str = "signature";
const ORDER_ID_FIELD: &str = "orderId";
const TRANS_ID_FIELD: &str = "transId";
const AMOUNT_FIELD: &str = "amount";
const RESULT_CODE_FIELD: &str = "resultCode";
const SUCCESS_CODE: &str = "0";

/// The exact field list MoMo signs on IPN delivery, in signing order.
const IPN_SIGNED_FIELDS: &[&str] = &[
    "accessKey",
    "amount",
    "extraData",
    "message",
    "orderId",
    "orderInfo",
    "orderType",
    "partnerCode",
    "payType",
    "requestId",
    "responseTime",
    "resultCode",
    "transId",
];

const IPN_PROFILE: CanonicalProfile = CanonicalProfile {
    excluded_fields: &["signature"],
    skip_empty_values: false,
    field_whitelist: Some(IPN_SIGNED_FIELDS),
};

/// The field list MoMo signs on create-payment requests.
const CREATE_SIGNED_FIELDS: &[&str] = &[
    "accessKey",
    "amount",
    "extraData",
    "ipnUrl",
    "orderId",
    "orderInfo",
    "partnerCode",
    "redirectUrl",
    "requestId",
    "requestType",
];

const CREATE_PROFILE: CanonicalProfile = CanonicalProfile {
    excluded_fields: &["signature"],
    skip_empty_values: false,
    field_whitelist: Some(CREATE_SIGNED_FIELDS),
};

/// MoMo wallet adapter.
pub struct MomoGateway {
    partner_code: String,
    access_key: String,
    secret_key: SecretString,
    endpoint: String,
    notify_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct MomoCreateResponse {
    #[serde(rename = "payUrl")]
    pay_url: String,
    #[serde(rename = "qrCodeUrl")]
    qr_code_url: Option<String>,
    deeplink: Option<String>,
}

impl MomoGateway {
    pub fn new(config: &MomoConfig, client: reqwest::Client) -> Self {
        Self {
            partner_code: config.partner_code.clone(),
            access_key: config.access_key.clone(),
            secret_key: config.secret_key.clone(),
            endpoint: config.endpoint.clone(),
            notify_url: config.notify_url.clone(),
            client,
        }
    }

    fn secret_bytes(&self) -> &[u8] {
        self.secret_key.expose_secret().as_bytes()
    }

    /// The access key never travels in the callback; it joins the signing
    /// string from configuration.
    fn with_access_key(&self, params: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        let mut augmented = params.clone();
        augmented.insert("accessKey".to_string(), self.access_key.clone());
        augmented
    }
}

#[async_trait]
impl GatewayAdapter for MomoGateway {
    fn provider(&self) -> GatewayProvider {
        GatewayProvider::Momo
    }

    fn verify(&self, params: &BTreeMap<String, String>) -> bool {
        let claimed = match params.get(SIGNATURE_FIELD) {
            Some(signature) => signature,
            None => return false,
        };
        SignatureCodec::verify(
            &self.with_access_key(params),
            claimed,
            self.secret_bytes(),
            SignatureDigest::Sha256,
            &IPN_PROFILE,
        )
    }

    fn extract(&self, params: &BTreeMap<String, String>) -> Result<CallbackFacts, ReconcileError> {
        let order_code = params
            .get(ORDER_ID_FIELD)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ReconcileError::Malformed(ORDER_ID_FIELD.to_string()))?;
        let result_code = params
            .get(RESULT_CODE_FIELD)
            .ok_or_else(|| ReconcileError::Malformed(RESULT_CODE_FIELD.to_string()))?;

        let outcome = if result_code == SUCCESS_CODE {
            GatewayOutcome::Success
        } else {
            GatewayOutcome::Declined {
                code: result_code.clone(),
            }
        };

        Ok(CallbackFacts {
            order_code: OrderCode::from_string(order_code.clone()),
            provider_txn_id: params
                .get(TRANS_ID_FIELD)
                .filter(|v| !v.is_empty())
                .cloned(),
            outcome,
        })
    }

    fn paid_amount(&self, params: &BTreeMap<String, String>) -> Result<Decimal, ReconcileError> {
        // MoMo reports whole VND; no unit conversion needed.
        params
            .get(AMOUNT_FIELD)
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(|| ReconcileError::Malformed(AMOUNT_FIELD.to_string()))
    }

    async fn begin_checkout(
        &self,
        order: &Order,
        ctx: &CheckoutContext,
    ) -> Result<CheckoutIntent, DomainError> {
        let request_id = format!("{}-{}", order.order_code, Uuid::new_v4().simple());
        let amount = order.amount.trunc().normalize().to_string();
        let order_info = format!("Payment for order {}", order.order_code);

        let mut params = BTreeMap::new();
        params.insert("accessKey".to_string(), self.access_key.clone());
        params.insert(AMOUNT_FIELD.to_string(), amount.clone());
        params.insert("extraData".to_string(), String::new());
        params.insert("ipnUrl".to_string(), self.notify_url.clone());
        params.insert(ORDER_ID_FIELD.to_string(), order.order_code.to_string());
        params.insert("orderInfo".to_string(), order_info.clone());
        params.insert("partnerCode".to_string(), self.partner_code.clone());
        params.insert("redirectUrl".to_string(), ctx.return_url.clone());
        params.insert("requestId".to_string(), request_id.clone());
        params.insert("requestType".to_string(), "captureWallet".to_string());

        let signature = SignatureCodec::sign(
            &params,
            self.secret_bytes(),
            SignatureDigest::Sha256,
            &CREATE_PROFILE,
        );

        let payload = json!({
            "partnerCode": self.partner_code,
            "accessKey": self.access_key,
            "requestId": request_id,
            "amount": amount,
            "orderId": order.order_code.to_string(),
            "orderInfo": order_info,
            "redirectUrl": ctx.return_url,
            "ipnUrl": self.notify_url,
            "requestType": "captureWallet",
            "extraData": "",
            "signature": signature,
            "lang": "vi",
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                DomainError::new(
                    ErrorCode::ExternalServiceError,
                    format!("MoMo create-payment request failed: {}", err),
                )
            })?
            .error_for_status()
            .map_err(|err| {
                DomainError::new(
                    ErrorCode::ExternalServiceError,
                    format!("MoMo create-payment rejected: {}", err),
                )
            })?;

        let body: MomoCreateResponse = response.json().await.map_err(|err| {
            DomainError::new(
                ErrorCode::ExternalServiceError,
                format!("MoMo create-payment response unreadable: {}", err),
            )
        })?;

        Ok(CheckoutIntent::Wallet {
            pay_url: body.pay_url,
            qr_code_url: body.qr_code_url,
            deeplink: body.deeplink,
        })
    }

    fn acknowledge(&self, result: &Result<ReconcileOutcome, ReconcileError>) -> JsonValue {
        // resultCode 0 acknowledges durable processing - including recorded
        // rejections - so MoMo stops redelivering. Nonzero asks for
        // redelivery, used only when nothing durable was written.
        let processed = match result {
            Ok(_) => true,
            Err(err) => !err.is_retryable() && !matches!(err, ReconcileError::Malformed(_)),
        };
        if processed {
            json!({ "resultCode": 0, "message": "Confirm Success" })
        } else {
            json!({ "resultCode": 1, "message": "Confirm Fail" })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "momo_test_secret";
    const ACCESS_KEY: &str = "momo_access_key";

    fn gateway() -> MomoGateway {
        MomoGateway::new(
            &MomoConfig {
                partner_code: "MOMOBOOK".to_string(),
                access_key: ACCESS_KEY.to_string(),
                secret_key: SecretString::new(SECRET.to_string()),
                endpoint: "https://test-payment.momo.vn/v2/gateway/api/create".to_string(),
                return_url: "https://bookgate.example/payment/result".to_string(),
                notify_url: "https://bookgate.example/api/ipn/momo".to_string(),
            },
            reqwest::Client::new(),
        )
    }

    /// Builds an IPN parameter set signed the way MoMo signs it: fixed
    /// field list, access key from configuration, empties included.
    fn signed_ipn(order_code: &str, amount: &str, result_code: &str) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert(ORDER_ID_FIELD.to_string(), order_code.to_string());
        params.insert(AMOUNT_FIELD.to_string(), amount.to_string());
        params.insert(RESULT_CODE_FIELD.to_string(), result_code.to_string());
        params.insert(TRANS_ID_FIELD.to_string(), "2147483647".to_string());
        params.insert("partnerCode".to_string(), "MOMOBOOK".to_string());
        params.insert("orderInfo".to_string(), "Payment".to_string());
        params.insert("orderType".to_string(), "momo_wallet".to_string());
        params.insert("payType".to_string(), "qr".to_string());
        params.insert("requestId".to_string(), "req-1".to_string());
        params.insert("responseTime".to_string(), "1767225600000".to_string());
        params.insert("message".to_string(), "Successful.".to_string());
        params.insert("extraData".to_string(), String::new());

        let mut signed = params.clone();
        signed.insert("accessKey".to_string(), ACCESS_KEY.to_string());
        let signature =
            SignatureCodec::sign(&signed, SECRET.as_bytes(), SignatureDigest::Sha256, &IPN_PROFILE);
        params.insert(SIGNATURE_FIELD.to_string(), signature);
        params
    }

    // ══════════════════════════════════════════════════════════════
    // Verification
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn genuine_ipn_verifies() {
        let params = signed_ipn("ORD-20260101-0001", "299000", "0");
        assert!(gateway().verify(&params));
    }

    #[test]
    fn tampered_result_code_fails_verification() {
        let mut params = signed_ipn("ORD-20260101-0001", "299000", "1006");
        params.insert(RESULT_CODE_FIELD.to_string(), "0".to_string());
        assert!(!gateway().verify(&params));
    }

    #[test]
    fn missing_signature_fails_verification() {
        let mut params = signed_ipn("ORD-20260101-0001", "299000", "0");
        params.remove(SIGNATURE_FIELD);
        assert!(!gateway().verify(&params));
    }

    #[test]
    fn injected_unsigned_field_does_not_disturb_the_signature() {
        // Fields outside MoMo's documented list never enter the signing
        // string, so they cannot be used to confuse verification.
        let mut params = signed_ipn("ORD-20260101-0001", "299000", "0");
        params.insert("injected".to_string(), "value".to_string());
        assert!(gateway().verify(&params));
    }

    #[test]
    fn verification_fails_with_wrong_access_key() {
        let params = signed_ipn("ORD-20260101-0001", "299000", "0");
        let other = MomoGateway::new(
            &MomoConfig {
                partner_code: "MOMOBOOK".to_string(),
                access_key: "different_access_key".to_string(),
                secret_key: SecretString::new(SECRET.to_string()),
                endpoint: "https://test-payment.momo.vn/v2/gateway/api/create".to_string(),
                return_url: "https://bookgate.example/payment/result".to_string(),
                notify_url: "https://bookgate.example/api/ipn/momo".to_string(),
            },
            reqwest::Client::new(),
        );
        assert!(!other.verify(&params));
    }

    // ══════════════════════════════════════════════════════════════
    // Extraction & Normalization
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn extract_reads_reference_txn_and_outcome() {
        let params = signed_ipn("ORD-20260101-0001", "299000", "0");
        let facts = gateway().extract(&params).unwrap();

        assert_eq!(facts.order_code.as_str(), "ORD-20260101-0001");
        assert_eq!(facts.provider_txn_id.as_deref(), Some("2147483647"));
        assert!(facts.outcome.is_success());
    }

    #[test]
    fn extract_maps_nonzero_result_code_to_declined() {
        let params = signed_ipn("ORD-20260101-0001", "299000", "1006");
        let facts = gateway().extract(&params).unwrap();
        assert_eq!(
            facts.outcome,
            GatewayOutcome::Declined {
                code: "1006".to_string()
            }
        );
    }

    #[test]
    fn extract_rejects_missing_order_id() {
        let mut params = signed_ipn("ORD-20260101-0001", "299000", "0");
        params.remove(ORDER_ID_FIELD);
        assert!(matches!(
            gateway().extract(&params),
            Err(ReconcileError::Malformed(_))
        ));
    }

    #[test]
    fn paid_amount_is_plain_currency_units() {
        use rust_decimal_macros::dec;
        let params = signed_ipn("ORD-20260101-0001", "299000", "0");
        assert_eq!(gateway().paid_amount(&params).unwrap(), dec!(299000));
    }

    // ══════════════════════════════════════════════════════════════
    // Acknowledgments
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn recorded_outcomes_acknowledge_with_zero() {
        let gateway = gateway();

        let declined: Result<ReconcileOutcome, _> = Err(ReconcileError::GatewayDeclined {
            code: "1006".to_string(),
        });
        assert_eq!(gateway.acknowledge(&declined)["resultCode"], 0);

        let forged: Result<ReconcileOutcome, _> = Err(ReconcileError::Authenticity);
        assert_eq!(gateway.acknowledge(&forged)["resultCode"], 0);

        let mismatch: Result<ReconcileOutcome, _> = Err(ReconcileError::AmountMismatch);
        assert_eq!(gateway.acknowledge(&mismatch)["resultCode"], 0);
    }

    #[test]
    fn unrecorded_failures_request_redelivery() {
        let gateway = gateway();

        let not_found: Result<ReconcileOutcome, _> = Err(ReconcileError::OrderNotFound);
        assert_eq!(gateway.acknowledge(&not_found)["resultCode"], 1);

        let transient: Result<ReconcileOutcome, _> =
            Err(ReconcileError::Ledger("down".to_string()));
        assert_eq!(gateway.acknowledge(&transient)["resultCode"], 1);

        let malformed: Result<ReconcileOutcome, _> =
            Err(ReconcileError::Malformed("orderId".to_string()));
        assert_eq!(gateway.acknowledge(&malformed)["resultCode"], 1);
    }
}
