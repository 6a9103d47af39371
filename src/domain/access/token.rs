//! Short-lived capability tokens for protected media.
//!
//! A token is a self-contained signed value: resource id, issue and expiry
//! timestamps, HMAC-SHA256 over the claims keyed by the server secret.
//! There is no revocation list - tokens die by expiring, which is why the
//! windows stay short.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::Timestamp;
use crate::domain::payments::{constant_time_eq, SignatureCodec, SignatureDigest};

/// Default time-to-live for media tokens: 5 minutes.
pub const DEFAULT_MEDIA_TTL_SECS: u64 = 300;

/// The one error every failed verification collapses into.
///
/// Malformed encoding, an expired timestamp, and a signature mismatch are
/// deliberately indistinguishable to callers - distinct rejections would
/// hand an attacker an oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid media token")]
pub struct TokenInvalid;

/// Claims embedded in a media token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaClaims {
    /// The protected resource this token unlocks.
    pub resource_id: String,
    /// Unix seconds the token was issued.
    pub issued_at: u64,
    /// Unix seconds the token stops working.
    pub expires_at: u64,
}

/// Issues and verifies media capability tokens.
///
/// Stateless: the same resource/ttl pair can be issued any number of
/// times, and nothing tracks outstanding tokens.
pub struct MediaTokenService {
    secret: Vec<u8>,
}

impl MediaTokenService {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Issues a token for `resource_id` valid for `ttl_secs` from now.
    pub fn issue(&self, resource_id: &str, ttl_secs: u64) -> String {
        self.issue_at(resource_id, ttl_secs, Timestamp::now())
    }

    /// Issues a token anchored at an explicit instant.
    pub fn issue_at(&self, resource_id: &str, ttl_secs: u64, now: Timestamp) -> String {
        let claims = MediaClaims {
            resource_id: resource_id.to_string(),
            issued_at: now.as_unix_secs(),
            expires_at: now.plus_secs(ttl_secs).as_unix_secs(),
        };
        let payload = serde_json::to_vec(&claims)
            .expect("Claims serialization should never fail for well-formed claims");
        let signature =
            SignatureCodec::hmac_bytes(&payload, &self.secret, SignatureDigest::Sha256);
        format!("{}.{}", hex::encode(payload), hex::encode(signature))
    }

    /// Verifies a token against the clock and `max_age_secs`.
    ///
    /// Valid iff the signature recomputation matches, the current time is
    /// at or before the embedded expiry, and the token is no older than
    /// `max_age_secs`.
    pub fn verify(&self, token: &str, max_age_secs: u64) -> Result<MediaClaims, TokenInvalid> {
        self.verify_at(token, max_age_secs, Timestamp::now())
    }

    /// Verifies a token against an explicit instant.
    pub fn verify_at(
        &self,
        token: &str,
        max_age_secs: u64,
        now: Timestamp,
    ) -> Result<MediaClaims, TokenInvalid> {
        let (payload_hex, signature_hex) = token.split_once('.').ok_or(TokenInvalid)?;
        let payload = hex::decode(payload_hex).map_err(|_| TokenInvalid)?;
        let claimed = hex::decode(signature_hex).map_err(|_| TokenInvalid)?;

        let expected =
            SignatureCodec::hmac_bytes(&payload, &self.secret, SignatureDigest::Sha256);
        if !constant_time_eq(&expected, &claimed) {
            return Err(TokenInvalid);
        }

        let claims: MediaClaims = serde_json::from_slice(&payload).map_err(|_| TokenInvalid)?;

        let now_secs = now.as_unix_secs();
        if now_secs > claims.expires_at {
            return Err(TokenInvalid);
        }
        if now_secs.saturating_sub(claims.issued_at) > max_age_secs {
            return Err(TokenInvalid);
        }

        Ok(claims)
    }

    /// Verifies a token and additionally checks that it was issued for the
    /// requested resource.
    pub fn verify_for(
        &self,
        token: &str,
        resource_id: &str,
        max_age_secs: u64,
    ) -> Result<MediaClaims, TokenInvalid> {
        self.verify_for_at(token, resource_id, max_age_secs, Timestamp::now())
    }

    /// Resource-bound verification against an explicit instant.
    pub fn verify_for_at(
        &self,
        token: &str,
        resource_id: &str,
        max_age_secs: u64,
        now: Timestamp,
    ) -> Result<MediaClaims, TokenInvalid> {
        let claims = self.verify_at(token, max_age_secs, now)?;
        if claims.resource_id != resource_id {
            return Err(TokenInvalid);
        }
        Ok(claims)
    }
}
