//! Car model
//!
//! Inventory items owned by exactly one dealer. Ownership scoping is enforced
//! by `services::car::CarService` before any read or mutation.

use serde::{Deserialize, Serialize};

/// Car entity in a dealer's inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    /// Unique identifier
    pub id: i64,
    /// Make (e.g. Audi, BMW)
    pub make: String,
    /// Model (e.g. A4, X5)
    pub model: String,
    /// Model year
    pub year: i32,
    /// Registration plate
    pub number_plate: String,
    /// Owning dealer
    pub dealer_id: i64,
}

/// Client input for adding a car.
///
/// Deliberately carries no owner field; the owning dealer is always stamped
/// from the authenticated identity.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCar {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub number_plate: String,
}

/// Stock count for a (make, model) pair within one dealer's inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub make: String,
    pub model: String,
    pub stock_level: i64,
}

impl StockLevel {
    /// Zero-count result for a (make, model) pair with no matching cars.
    pub fn empty(make: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            stock_level: 0,
        }
    }
}
