//! Authentication service
//!
//! Turns dealer credentials into a rotatable server-side session token plus a
//! signed client-held identity assertion, and resolves inbound assertions
//! back to a dealer identity.
//!
//! Session model: at most one live token per dealer. A re-login overwrites
//! the stored token atomically; assertions already issued under the previous
//! value stay valid until their own expiry, because resolution is a pure
//! signature check (see DESIGN.md for the trade-off).

use anyhow::{Context, Result};
use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{DateTime, Duration, Utc};
use data_encoding::HEXLOWER;
use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::db::repositories::{DealerRepository, SessionTokenRepository};
use crate::models::{Dealer, SessionToken};
use crate::services::assertion::{AssertionSigner, IdentityClaims};
use crate::services::password::{hash_password, verify_password};

/// Default session lifetime in days
const DEFAULT_SESSION_EXPIRATION_DAYS: i64 = 7;

// Verified against when the login name is unknown, so that the two rejection
// paths cost the same amount of hashing work.
static DUMMY_HASH: Lazy<String> =
    Lazy::new(|| hash_password("carstock-timing-equalizer").expect("Failed to hash dummy password"));

/// Error types for authentication operations
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Login name/password mismatch. Unknown name and wrong password are
    /// deliberately indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed, or expired identity assertion
    #[error("Unauthenticated")]
    Unauthenticated,

    /// Missing or invalid input fields
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error (store or crypto failure)
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// A successful login: the dealer plus their fresh signed assertion.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub dealer: Dealer,
    pub assertion: String,
    pub expires_at: DateTime<Utc>,
}

/// Authentication service for dealers
pub struct AuthService {
    dealer_repo: Arc<dyn DealerRepository>,
    session_repo: Arc<dyn SessionTokenRepository>,
    signer: AssertionSigner,
    session_expiration_days: i64,
}

impl AuthService {
    pub fn new(
        dealer_repo: Arc<dyn DealerRepository>,
        session_repo: Arc<dyn SessionTokenRepository>,
        signer: AssertionSigner,
    ) -> Self {
        Self {
            dealer_repo,
            session_repo,
            signer,
            session_expiration_days: DEFAULT_SESSION_EXPIRATION_DAYS,
        }
    }

    /// Create an authentication service with a custom session lifetime
    pub fn with_session_expiration(
        dealer_repo: Arc<dyn DealerRepository>,
        session_repo: Arc<dyn SessionTokenRepository>,
        signer: AssertionSigner,
        session_expiration_days: i64,
    ) -> Self {
        Self {
            dealer_repo,
            session_repo,
            signer,
            session_expiration_days,
        }
    }

    /// Session lifetime in days (also the client cookie Max-Age basis)
    pub fn session_expiration_days(&self) -> i64 {
        self.session_expiration_days
    }

    /// Authenticate a dealer and establish their session.
    ///
    /// On success the dealer's session token is rotated: a fresh random value
    /// replaces any existing row for this dealer in a single atomic upsert,
    /// silently superseding older sessions.
    pub async fn login(
        &self,
        name: &str,
        password: &str,
    ) -> Result<AuthenticatedSession, AuthError> {
        if name.trim().is_empty() {
            return Err(AuthError::ValidationError("Name cannot be empty".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::ValidationError(
                "Password cannot be empty".to_string(),
            ));
        }

        let dealer = self
            .dealer_repo
            .get_by_name(name)
            .await
            .context("Failed to look up dealer")?;

        let dealer = match dealer {
            Some(dealer) => dealer,
            None => {
                // Burn the same hashing cost as the wrong-password path
                let _ = verify_password(password, &DUMMY_HASH);
                tracing::debug!(name, "Login rejected: unknown dealer");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let password_valid = verify_password(password, &dealer.password_hash)
            .context("Failed to verify password")?;
        if !password_valid {
            tracing::debug!(dealer_id = dealer.dealer_id, "Login rejected: bad password");
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        let expires_at = now + Duration::days(self.session_expiration_days);
        let token = generate_token();

        self.session_repo
            .upsert(&SessionToken {
                dealer_id: dealer.dealer_id,
                token: token.clone(),
                expires_at,
                created_at: now,
            })
            .await
            .context("Failed to store session token")?;

        let claims = IdentityClaims {
            dealer_id: dealer.dealer_id,
            name: dealer.name.clone(),
            token,
            expires_at: expires_at.timestamp(),
        };
        let assertion = self
            .signer
            .sign(&claims)
            .context("Failed to sign identity assertion")?;

        tracing::info!(dealer_id = dealer.dealer_id, "Dealer logged in");

        Ok(AuthenticatedSession {
            dealer,
            assertion,
            expires_at,
        })
    }

    /// Resolve an inbound assertion to the dealer identity it asserts.
    ///
    /// Pure signature and expiry check; the stored session token is not
    /// consulted, so repeated calls have no side effects.
    pub fn resolve_identity(&self, assertion: &str) -> Result<IdentityClaims, AuthError> {
        let claims = self
            .signer
            .verify(assertion)
            .map_err(|_| AuthError::Unauthenticated)?;

        if claims.is_expired() {
            return Err(AuthError::Unauthenticated);
        }

        Ok(claims)
    }

    /// Sliding expiration: re-issue the assertion when more than half its
    /// validity window has elapsed.
    ///
    /// The underlying token value is unchanged; only the signed expiry moves,
    /// up to the full window from "now".
    pub fn renew(&self, claims: &IdentityClaims) -> Result<Option<String>, AuthError> {
        let window_secs = self.session_expiration_days * 24 * 60 * 60;
        if claims.remaining_secs() * 2 >= window_secs {
            return Ok(None);
        }

        let renewed = IdentityClaims {
            expires_at: (Utc::now() + Duration::days(self.session_expiration_days)).timestamp(),
            ..claims.clone()
        };
        let assertion = self
            .signer
            .sign(&renewed)
            .context("Failed to sign renewed assertion")?;

        Ok(Some(assertion))
    }

    /// Delete expired session token rows (maintenance, run at startup).
    pub async fn cleanup_expired_tokens(&self) -> Result<i64, AuthError> {
        let count = self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to delete expired session tokens")?;
        Ok(count)
    }
}

/// Generate a 256-bit random token, hex-encoded.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    HEXLOWER.encode(&bytes)
}
