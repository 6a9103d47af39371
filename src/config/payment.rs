//! Payment gateway configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Payment configuration covering both gateways.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    pub vnpay: VnpayConfig,
    pub momo: MomoConfig,
}

impl PaymentConfig {
    /// Validate payment configuration.
    ///
    /// A missing signing secret is a fatal startup error - reconciliation
    /// must never run with an empty key.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.vnpay.validate()?;
        self.momo.validate()?;
        Ok(())
    }
}

/// VNPay gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct VnpayConfig {
    /// Merchant terminal code issued by VNPay.
    pub tmn_code: String,

    /// HMAC-SHA512 signing secret.
    pub hash_secret: SecretString,

    /// Hosted payment page base URL.
    pub pay_url: String,

    /// Where VNPay sends the buyer back after payment.
    pub return_url: String,
}

impl VnpayConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.tmn_code.is_empty() {
            return Err(ValidationError::MissingRequired(
                "BOOKGATE__PAYMENT__VNPAY__TMN_CODE",
            ));
        }
        if self.hash_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired(
                "BOOKGATE__PAYMENT__VNPAY__HASH_SECRET",
            ));
        }
        if !self.pay_url.starts_with("https://") {
            return Err(ValidationError::InvalidGatewayUrl("vnpay.pay_url"));
        }
        Ok(())
    }
}

/// MoMo gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MomoConfig {
    /// Partner code issued by MoMo.
    pub partner_code: String,

    /// Access key for request signing.
    pub access_key: String,

    /// HMAC-SHA256 signing secret.
    pub secret_key: SecretString,

    /// Create-payment API endpoint.
    pub endpoint: String,

    /// Where MoMo sends the buyer back after payment.
    pub return_url: String,

    /// Server-to-server IPN URL registered with MoMo.
    pub notify_url: String,
}

impl MomoConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.partner_code.is_empty() {
            return Err(ValidationError::MissingRequired(
                "BOOKGATE__PAYMENT__MOMO__PARTNER_CODE",
            ));
        }
        if self.access_key.is_empty() {
            return Err(ValidationError::MissingRequired(
                "BOOKGATE__PAYMENT__MOMO__ACCESS_KEY",
            ));
        }
        if self.secret_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired(
                "BOOKGATE__PAYMENT__MOMO__SECRET_KEY",
            ));
        }
        if !self.endpoint.starts_with("https://") {
            return Err(ValidationError::InvalidGatewayUrl("momo.endpoint"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vnpay() -> VnpayConfig {
        VnpayConfig {
            tmn_code: "BOOKGATE1".to_string(),
            hash_secret: SecretString::new("vnpay_secret".to_string()),
            pay_url: "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html".to_string(),
            return_url: "https://bookgate.example/payment/result".to_string(),
        }
    }

    fn momo() -> MomoConfig {
        MomoConfig {
            partner_code: "MOMOBOOK".to_string(),
            access_key: "access_key".to_string(),
            secret_key: SecretString::new("momo_secret".to_string()),
            endpoint: "https://test-payment.momo.vn/v2/gateway/api/create".to_string(),
            return_url: "https://bookgate.example/payment/result".to_string(),
            notify_url: "https://bookgate.example/api/ipn/momo".to_string(),
        }
    }

    #[test]
    fn complete_config_validates() {
        let config = PaymentConfig {
            vnpay: vnpay(),
            momo: momo(),
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_vnpay_secret_is_fatal() {
        let mut config = vnpay();
        config.hash_secret = SecretString::new(String::new());
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired(_))
        ));
    }

    #[test]
    fn empty_momo_secret_is_fatal() {
        let mut config = momo();
        config.secret_key = SecretString::new(String::new());
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired(_))
        ));
    }

    #[test]
    fn plain_http_gateway_url_fails() {
        let mut config = vnpay();
        config.pay_url = "http://insecure.example/pay".to_string();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidGatewayUrl(_))
        ));
    }

    #[test]
    fn secret_debug_output_is_redacted() {
        let config = vnpay();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("vnpay_secret"));
    }
}
