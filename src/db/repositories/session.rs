//! Session token repository
//!
//! Persistence for the per-dealer rotating authentication token. The table is
//! keyed by `dealer_id`, so the upsert is the only write path and the
//! one-live-token-per-dealer invariant holds even under concurrent logins
//! (last writer wins atomically).

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::SessionToken;

/// Session token repository trait
#[async_trait]
pub trait SessionTokenRepository: Send + Sync {
    /// Insert or replace the token row for a dealer
    async fn upsert(&self, token: &SessionToken) -> Result<SessionToken>;

    /// Get the active token row for a dealer
    async fn get_by_dealer(&self, dealer_id: i64) -> Result<Option<SessionToken>>;

    /// Delete expired token rows, returning how many were removed
    async fn delete_expired(&self) -> Result<i64>;
}

/// SQLx-based session token repository implementation
pub struct SqlxSessionTokenRepository {
    pool: DbPool,
}

impl SqlxSessionTokenRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn SessionTokenRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SessionTokenRepository for SqlxSessionTokenRepository {
    async fn upsert(&self, token: &SessionToken) -> Result<SessionToken> {
        sqlx::query(
            r#"
            INSERT INTO auth_tokens (dealer_id, token, expires_at, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(dealer_id) DO UPDATE
            SET token = excluded.token, expires_at = excluded.expires_at
            "#,
        )
        .bind(token.dealer_id)
        .bind(&token.token)
        .bind(token.expires_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to upsert session token")?;

        Ok(token.clone())
    }

    async fn get_by_dealer(&self, dealer_id: i64) -> Result<Option<SessionToken>> {
        let row = sqlx::query(
            r#"
            SELECT dealer_id, token, expires_at, created_at
            FROM auth_tokens
            WHERE dealer_id = ?
            "#,
        )
        .bind(dealer_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get session token")?;

        Ok(row.map(|row| SessionToken {
            dealer_id: row.get("dealer_id"),
            token: row.get("token"),
            expires_at: row.get("expires_at"),
            created_at: row.get("created_at"),
        }))
    }

    async fn delete_expired(&self) -> Result<i64> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE expires_at < ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .context("Failed to delete expired session tokens")?;

        Ok(result.rows_affected() as i64)
    }
}
