//! Car inventory service
//!
//! Every operation takes the caller's authenticated `dealer_id` explicitly
//! and enforces ownership scoping before touching a row. Ownership mismatches
//! are reported as not-found so the existence of other dealers' cars never
//! leaks.

use anyhow::Context;
use std::sync::Arc;

use crate::db::repositories::CarRepository;
use crate::models::{Car, NewCar, StockLevel};

/// Error types for inventory operations
#[derive(Debug, thiserror::Error)]
pub enum CarServiceError {
    /// Car missing or owned by another dealer (indistinguishable by design)
    #[error("{0}")]
    NotFound(String),

    /// Missing or invalid input fields
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error (store failure)
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Inventory service scoped per-dealer
pub struct CarService {
    car_repo: Arc<dyn CarRepository>,
}

impl CarService {
    pub fn new(car_repo: Arc<dyn CarRepository>) -> Self {
        Self { car_repo }
    }

    /// Add a car to the caller's inventory.
    ///
    /// The owner is always stamped from the authenticated identity; client
    /// input carries no owner field.
    pub async fn add_car(&self, dealer_id: i64, input: NewCar) -> Result<Car, CarServiceError> {
        validate_required(&input.make, "Make")?;
        validate_required(&input.model, "Model")?;
        validate_required(&input.number_plate, "Number plate")?;

        let car = self
            .car_repo
            .create(&Car {
                id: 0,
                make: input.make.trim().to_string(),
                model: input.model.trim().to_string(),
                year: input.year,
                number_plate: input.number_plate.trim().to_string(),
                dealer_id,
            })
            .await
            .context("Failed to add car")?;

        tracing::info!(dealer_id, car_id = car.id, "Car added");
        Ok(car)
    }

    /// Remove a car from the caller's inventory.
    ///
    /// A missing car and a car owned by another dealer produce the same
    /// not-found error.
    pub async fn remove_car(&self, dealer_id: i64, car_id: i64) -> Result<(), CarServiceError> {
        let car = self
            .car_repo
            .get_by_id(car_id)
            .await
            .context("Failed to look up car")?;

        match car {
            Some(car) if car.dealer_id == dealer_id => {
                self.car_repo
                    .delete(car_id)
                    .await
                    .context("Failed to remove car")?;
                tracing::info!(dealer_id, car_id, "Car removed");
                Ok(())
            }
            _ => Err(CarServiceError::NotFound(format!(
                "Car with ID {} not found for dealer {}",
                car_id, dealer_id
            ))),
        }
    }

    /// List all cars in the caller's inventory.
    pub async fn list_cars(&self, dealer_id: i64) -> Result<Vec<Car>, CarServiceError> {
        let cars = self
            .car_repo
            .list_by_dealer(dealer_id)
            .await
            .context("Failed to list cars")?;
        Ok(cars)
    }

    /// Search the caller's inventory by exact make and model.
    pub async fn search_cars(
        &self,
        dealer_id: i64,
        make: &str,
        model: &str,
    ) -> Result<Vec<Car>, CarServiceError> {
        validate_required(make, "Make")?;
        validate_required(model, "Model")?;

        let cars = self
            .car_repo
            .search(dealer_id, make.trim(), model.trim())
            .await
            .context("Failed to search cars")?;
        Ok(cars)
    }

    /// Stock count for a (make, model) pair in the caller's inventory.
    ///
    /// Zero matching cars yields a zero-count result, not an error.
    pub async fn stock_level(
        &self,
        dealer_id: i64,
        make: &str,
        model: &str,
    ) -> Result<StockLevel, CarServiceError> {
        validate_required(make, "Make")?;
        validate_required(model, "Model")?;

        let stock = self
            .car_repo
            .stock_level(dealer_id, make.trim(), model.trim())
            .await
            .context("Failed to get stock level")?;
        Ok(stock)
    }
}

fn validate_required(value: &str, field: &str) -> Result<(), CarServiceError> {
    if value.trim().is_empty() {
        return Err(CarServiceError::ValidationError(format!(
            "{} is required",
            field
        )));
    }
    Ok(())
}
