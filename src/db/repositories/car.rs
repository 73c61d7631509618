//! Car repository
//!
//! Database operations for dealer inventories. List, search and stock queries
//! filter by `dealer_id` in SQL so cross-dealer rows never leave the store;
//! the ownership check for single-row operations lives in the service layer.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{Car, StockLevel};

/// Car repository trait
#[async_trait]
pub trait CarRepository: Send + Sync {
    /// Insert a car, returning the row with its generated id
    async fn create(&self, car: &Car) -> Result<Car>;

    /// Get a car by its unique id
    async fn get_by_id(&self, id: i64) -> Result<Option<Car>>;

    /// Delete a car by id
    async fn delete(&self, id: i64) -> Result<()>;

    /// List all cars owned by a dealer
    async fn list_by_dealer(&self, dealer_id: i64) -> Result<Vec<Car>>;

    /// Search a dealer's cars by exact make and model
    async fn search(&self, dealer_id: i64, make: &str, model: &str) -> Result<Vec<Car>>;

    /// Grouped stock count for a (make, model) pair within one dealer's
    /// inventory; zero matching rows yields a zero-count result
    async fn stock_level(&self, dealer_id: i64, make: &str, model: &str) -> Result<StockLevel>;
}

/// SQLx-based car repository implementation
pub struct SqlxCarRepository {
    pool: DbPool,
}

impl SqlxCarRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn CarRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CarRepository for SqlxCarRepository {
    async fn create(&self, car: &Car) -> Result<Car> {
        let result = sqlx::query(
            r#"
            INSERT INTO cars (make, model, year, number_plate, dealer_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&car.make)
        .bind(&car.model)
        .bind(car.year)
        .bind(&car.number_plate)
        .bind(car.dealer_id)
        .execute(&self.pool)
        .await
        .context("Failed to create car")?;

        Ok(Car {
            id: result.last_insert_rowid(),
            ..car.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Car>> {
        let row = sqlx::query(
            "SELECT id, make, model, year, number_plate, dealer_id FROM cars WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get car by ID")?;

        Ok(row.map(|row| row_to_car(&row)))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM cars WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete car")?;

        Ok(())
    }

    async fn list_by_dealer(&self, dealer_id: i64) -> Result<Vec<Car>> {
        let rows = sqlx::query(
            r#"
            SELECT id, make, model, year, number_plate, dealer_id
            FROM cars
            WHERE dealer_id = ?
            ORDER BY id
            "#,
        )
        .bind(dealer_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list cars")?;

        Ok(rows.iter().map(row_to_car).collect())
    }

    async fn search(&self, dealer_id: i64, make: &str, model: &str) -> Result<Vec<Car>> {
        let rows = sqlx::query(
            r#"
            SELECT id, make, model, year, number_plate, dealer_id
            FROM cars
            WHERE dealer_id = ? AND make = ? AND model = ?
            ORDER BY id
            "#,
        )
        .bind(dealer_id)
        .bind(make)
        .bind(model)
        .fetch_all(&self.pool)
        .await
        .context("Failed to search cars")?;

        Ok(rows.iter().map(row_to_car).collect())
    }

    async fn stock_level(&self, dealer_id: i64, make: &str, model: &str) -> Result<StockLevel> {
        let row = sqlx::query(
            r#"
            SELECT make, model, COUNT(*) AS stock_level
            FROM cars
            WHERE dealer_id = ? AND make = ? AND model = ?
            GROUP BY make, model
            "#,
        )
        .bind(dealer_id)
        .bind(make)
        .bind(model)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get stock level")?;

        Ok(match row {
            Some(row) => StockLevel {
                make: row.get("make"),
                model: row.get("model"),
                stock_level: row.get("stock_level"),
            },
            None => StockLevel::empty(make, model),
        })
    }
}

fn row_to_car(row: &sqlx::sqlite::SqliteRow) -> Car {
    Car {
        id: row.get("id"),
        make: row.get("make"),
        model: row.get("model"),
        year: row.get("year"),
        number_plate: row.get("number_plate"),
        dealer_id: row.get("dealer_id"),
    }
}
