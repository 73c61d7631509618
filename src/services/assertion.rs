//! Signed identity assertions
//!
//! The client-held credential carried between requests. An assertion is a
//! base64url JSON claims payload followed by an HMAC-SHA256 signature:
//! `base64url(claims) "." base64url(hmac(key, payload))`. Verification is
//! purely cryptographic; it never touches the store.

use anyhow::{anyhow, Result};
use chrono::Utc;
use data_encoding::BASE64URL_NOPAD;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Claims embedded in a signed identity assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Authenticated dealer
    pub dealer_id: i64,
    /// Dealer's login name
    pub name: String,
    /// Current server-side session token value
    pub token: String,
    /// Assertion validity limit (unix seconds)
    pub expires_at: i64,
}

impl IdentityClaims {
    /// Check if the assertion's own validity window has passed
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now().timestamp()
    }

    /// Seconds until expiry (negative when already expired)
    pub fn remaining_secs(&self) -> i64 {
        self.expires_at - Utc::now().timestamp()
    }
}

/// Signs and verifies identity assertions with a server-held HMAC key.
#[derive(Clone)]
pub struct AssertionSigner {
    key: Vec<u8>,
}

impl AssertionSigner {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: secret.to_vec(),
        }
    }

    /// Produce a signed assertion string for the given claims.
    pub fn sign(&self, claims: &IdentityClaims) -> Result<String> {
        let payload =
            BASE64URL_NOPAD.encode(&serde_json::to_vec(claims).map_err(|e| {
                anyhow!("Failed to serialize identity claims: {}", e)
            })?);
        let signature = BASE64URL_NOPAD.encode(&self.mac(payload.as_bytes())?);
        Ok(format!("{}.{}", payload, signature))
    }

    /// Verify an assertion's signature and return its claims.
    ///
    /// Expiry is not checked here; callers decide what to do with an expired
    /// but authentic assertion.
    pub fn verify(&self, assertion: &str) -> Result<IdentityClaims> {
        let (payload, signature) = assertion
            .split_once('.')
            .ok_or_else(|| anyhow!("Malformed assertion"))?;

        let signature = BASE64URL_NOPAD
            .decode(signature.as_bytes())
            .map_err(|_| anyhow!("Malformed assertion signature"))?;

        // Constant-time comparison via the Mac verifier
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| anyhow!("Invalid HMAC key: {}", e))?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| anyhow!("Assertion signature mismatch"))?;

        let claims_bytes = BASE64URL_NOPAD
            .decode(payload.as_bytes())
            .map_err(|_| anyhow!("Malformed assertion payload"))?;
        let claims: IdentityClaims = serde_json::from_slice(&claims_bytes)
            .map_err(|e| anyhow!("Invalid assertion claims: {}", e))?;

        Ok(claims)
    }

    fn mac(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| anyhow!("Invalid HMAC key: {}", e))?;
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_claims() -> IdentityClaims {
        IdentityClaims {
            dealer_id: 1,
            name: "Velocity Motors".to_string(),
            token: "deadbeef".to_string(),
            expires_at: (Utc::now() + Duration::days(7)).timestamp(),
        }
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let signer = AssertionSigner::new(b"test-secret");
        let claims = test_claims();

        let assertion = signer.sign(&claims).unwrap();
        let verified = signer.verify(&assertion).unwrap();
        assert_eq!(verified, claims);
    }

    #[test]
    fn test_verify_rejects_tampered_payload() {
        let signer = AssertionSigner::new(b"test-secret");
        let assertion = signer.sign(&test_claims()).unwrap();

        // Swap the payload for a forged one keeping the original signature
        let (_, signature) = assertion.split_once('.').unwrap();
        let mut forged_claims = test_claims();
        forged_claims.dealer_id = 2;
        let forged_payload =
            BASE64URL_NOPAD.encode(&serde_json::to_vec(&forged_claims).unwrap());
        let forged = format!("{}.{}", forged_payload, signature);

        assert!(signer.verify(&forged).is_err());
    }

    #[test]
    fn test_verify_rejects_wrong_key() {
        let signer = AssertionSigner::new(b"test-secret");
        let other = AssertionSigner::new(b"other-secret");

        let assertion = signer.sign(&test_claims()).unwrap();
        assert!(other.verify(&assertion).is_err());
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let signer = AssertionSigner::new(b"test-secret");
        assert!(signer.verify("").is_err());
        assert!(signer.verify("no-dot-here").is_err());
        assert!(signer.verify("not!base64.not!base64").is_err());
    }

    #[test]
    fn test_expiry_helpers() {
        let mut claims = test_claims();
        assert!(!claims.is_expired());
        assert!(claims.remaining_secs() > 0);

        claims.expires_at = (Utc::now() - Duration::hours(1)).timestamp();
        assert!(claims.is_expired());
        assert!(claims.remaining_secs() < 0);
    }
}
