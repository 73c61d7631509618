//! Dealer model
//!
//! A dealer is a tenant account owning a private car inventory. Dealer rows
//! are provisioned out-of-band; the API never creates or mutates them.

use serde::{Deserialize, Serialize};

/// Dealer entity representing a tenant account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dealer {
    /// Unique identifier
    pub dealer_id: i64,
    /// Login handle (unique)
    pub name: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl Dealer {
    /// Create a new Dealer with the given parameters.
    ///
    /// Note: The password should already be hashed before calling this
    /// function. Use `services::password::hash_password()` to hash it.
    pub fn new(name: String, password_hash: String) -> Self {
        Self {
            dealer_id: 0, // Will be set by the database
            name,
            password_hash,
        }
    }
}
