//! Session token model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-held rotating secret proving a dealer's successful login.
///
/// At most one row exists per dealer; a re-login overwrites the token value
/// and expiry in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionToken {
    /// Owning dealer (primary key, one token per dealer)
    pub dealer_id: i64,
    /// Opaque random token value (256-bit, hex-encoded)
    pub token: String,
    /// Expiration timestamp
    pub expires_at: DateTime<Utc>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl SessionToken {
    /// Check if the token has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}
