//! Gateway signature canonicalization and HMAC verification.
//!
//! Each gateway signs a canonical string built from its callback parameters.
//! Canonicalization always operates on the raw fields exactly as received;
//! any unit normalization of amounts happens strictly after verification,
//! so the verified bytes are the gateway's own bytes.

use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha512};
use std::collections::BTreeMap;
use subtle::ConstantTimeEq;

/// Digest a gateway signs with. A per-provider constant, never negotiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureDigest {
    Sha256,
    Sha512,
}

/// How one gateway's parameter set folds into a signing string.
#[derive(Debug, Clone)]
pub struct CanonicalProfile {
    /// Parameters that never participate in the signing string
    /// (the signature itself and its companions).
    pub excluded_fields: &'static [&'static str],

    /// Omit parameters whose value is empty (VNPay behavior).
    pub skip_empty_values: bool,

    /// When set, exactly these fields participate - in the given order,
    /// with missing fields contributing an empty value (MoMo behavior).
    pub field_whitelist: Option<&'static [&'static str]>,
}

/// Deterministic canonicalization and constant-time signature checks.
pub struct SignatureCodec;

impl SignatureCodec {
    /// Folds a sorted parameter map into the `key=value&key=value` signing
    /// string described by the profile.
    pub fn canonicalize(params: &BTreeMap<String, String>, profile: &CanonicalProfile) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(params.len());

        match profile.field_whitelist {
            Some(fields) => {
                for field in fields {
                    let value = params.get(*field).map(String::as_str).unwrap_or("");
                    parts.push(format!("{}={}", field, value));
                }
            }
            None => {
                for (key, value) in params {
                    if profile.excluded_fields.contains(&key.as_str()) {
                        continue;
                    }
                    if profile.skip_empty_values && value.is_empty() {
                        continue;
                    }
                    parts.push(format!("{}={}", key, value));
                }
            }
        }

        parts.join("&")
    }

    /// Computes the raw HMAC over `data` with the given digest.
    pub fn hmac_bytes(data: &[u8], secret: &[u8], digest: SignatureDigest) -> Vec<u8> {
        match digest {
            SignatureDigest::Sha256 => {
                let mut mac = Hmac::<Sha256>::new_from_slice(secret)
                    .expect("HMAC accepts any key length");
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
            SignatureDigest::Sha512 => {
                let mut mac = Hmac::<Sha512>::new_from_slice(secret)
                    .expect("HMAC accepts any key length");
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
        }
    }

    /// Signs the canonicalized parameters, returning a lowercase hex digest.
    pub fn sign(
        params: &BTreeMap<String, String>,
        secret: &[u8],
        digest: SignatureDigest,
        profile: &CanonicalProfile,
    ) -> String {
        let canonical = Self::canonicalize(params, profile);
        hex::encode(Self::hmac_bytes(canonical.as_bytes(), secret, digest))
    }

    /// Recomputes the signature over the raw parameters and compares it to
    /// the claimed value in constant time.
    ///
    /// Returns false for malformed hex; the caller never learns which check
    /// failed.
    pub fn verify(
        params: &BTreeMap<String, String>,
        claimed_signature: &str,
        secret: &[u8],
        digest: SignatureDigest,
        profile: &CanonicalProfile,
    ) -> bool {
        let claimed = match hex::decode(claimed_signature.trim().to_lowercase()) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };
        let canonical = Self::canonicalize(params, profile);
        let expected = Self::hmac_bytes(canonical.as_bytes(), secret, digest);
        constant_time_eq(&expected, &claimed)
    }
}

/// Constant-time comparison of two byte slices.
///
/// Short-circuit comparison would leak a prefix-length timing signal.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
