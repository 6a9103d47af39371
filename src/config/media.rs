//! Protected media configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Signed media access configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// HMAC key for media capability tokens.
    pub signing_secret: SecretString,

    /// TTL for tokens handed out by the issue endpoint.
    #[serde(default = "default_issue_ttl_secs")]
    pub issue_ttl_secs: u64,

    /// Max age accepted when serving a protected file. Typically shorter
    /// than the issue TTL.
    #[serde(default = "default_serving_ttl_secs")]
    pub serving_ttl_secs: u64,
}

fn default_issue_ttl_secs() -> u64 {
    300
}

fn default_serving_ttl_secs() -> u64 {
    120
}

impl MediaConfig {
    /// Validate media configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.signing_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired(
                "BOOKGATE__MEDIA__SIGNING_SECRET",
            ));
        }
        if self.signing_secret.expose_secret().len() < 16 {
            return Err(ValidationError::WeakMediaSecret);
        }
        if self.issue_ttl_secs == 0 || self.serving_ttl_secs == 0 {
            return Err(ValidationError::InvalidTokenTtl);
        }
        Ok(())
    }
}
