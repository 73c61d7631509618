//! Dealer repository
//!
//! Lookup of dealer credential records. Dealers are provisioned out-of-band,
//! so `create` exists for provisioning scripts and tests; the API itself only
//! reads.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::Dealer;

/// Dealer repository trait
#[async_trait]
pub trait DealerRepository: Send + Sync {
    /// Insert a dealer record (provisioning)
    async fn create(&self, dealer: &Dealer) -> Result<Dealer>;

    /// Get dealer by ID
    async fn get_by_id(&self, dealer_id: i64) -> Result<Option<Dealer>>;

    /// Get dealer by login name
    async fn get_by_name(&self, name: &str) -> Result<Option<Dealer>>;
}

/// SQLx-based dealer repository implementation
pub struct SqlxDealerRepository {
    pool: DbPool,
}

impl SqlxDealerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn DealerRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl DealerRepository for SqlxDealerRepository {
    async fn create(&self, dealer: &Dealer) -> Result<Dealer> {
        let result = sqlx::query("INSERT INTO dealers (name, password_hash) VALUES (?, ?)")
            .bind(&dealer.name)
            .bind(&dealer.password_hash)
            .execute(&self.pool)
            .await
            .context("Failed to create dealer")?;

        Ok(Dealer {
            dealer_id: result.last_insert_rowid(),
            name: dealer.name.clone(),
            password_hash: dealer.password_hash.clone(),
        })
    }

    async fn get_by_id(&self, dealer_id: i64) -> Result<Option<Dealer>> {
        let row = sqlx::query(
            "SELECT dealer_id, name, password_hash FROM dealers WHERE dealer_id = ?",
        )
        .bind(dealer_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get dealer by ID")?;

        Ok(row.map(|row| row_to_dealer(&row)))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Dealer>> {
        let row =
            sqlx::query("SELECT dealer_id, name, password_hash FROM dealers WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to get dealer by name")?;

        Ok(row.map(|row| row_to_dealer(&row)))
    }
}

fn row_to_dealer(row: &sqlx::sqlite::SqliteRow) -> Dealer {
    Dealer {
        dealer_id: row.get("dealer_id"),
        name: row.get("name"),
        password_hash: row.get("password_hash"),
    }
}
