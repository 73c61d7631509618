//! Car inventory endpoints
//!
//! All routes operate on the authenticated dealer's own inventory:
//! - POST /api/cars - Add a car
//! - DELETE /api/cars/{car_id} - Remove a car
//! - GET /api/cars - List cars
//! - GET /api/cars/search?make=&model= - Search by make and model
//! - GET /api/cars/stock?make=&model= - Stock level for a make/model pair

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedDealer};
use crate::models::{Car, NewCar, StockLevel};
use crate::services::CarServiceError;

/// Query parameters for search and stock endpoints
#[derive(Debug, Deserialize)]
pub struct MakeModelQuery {
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
}

/// Build the cars router (mounted behind the auth middleware)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(add_car).get(list_cars))
        .route("/{car_id}", delete(remove_car))
        .route("/search", get(search_cars))
        .route("/stock", get(stock_levels))
}

fn map_car_error(e: CarServiceError) -> ApiError {
    match e {
        CarServiceError::NotFound(msg) => ApiError::not_found(msg),
        CarServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        CarServiceError::InternalError(err) => {
            tracing::error!(error = %err, "Inventory operation failed");
            ApiError::internal_error("An internal error occurred")
        }
    }
}

/// POST /api/cars - Add a car to the caller's inventory
async fn add_car(
    State(state): State<AppState>,
    dealer: AuthenticatedDealer,
    Json(body): Json<NewCar>,
) -> Result<Json<Car>, ApiError> {
    let car = state
        .car_service
        .add_car(dealer.0.dealer_id, body)
        .await
        .map_err(map_car_error)?;

    Ok(Json(car))
}

/// DELETE /api/cars/{car_id} - Remove a car from the caller's inventory
async fn remove_car(
    State(state): State<AppState>,
    dealer: AuthenticatedDealer,
    Path(car_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .car_service
        .remove_car(dealer.0.dealer_id, car_id)
        .await
        .map_err(map_car_error)?;

    Ok(Json(serde_json::json!({
        "message": format!("Car with ID {} successfully removed.", car_id)
    })))
}

/// GET /api/cars - List the caller's inventory
async fn list_cars(
    State(state): State<AppState>,
    dealer: AuthenticatedDealer,
) -> Result<Json<Vec<Car>>, ApiError> {
    let cars = state
        .car_service
        .list_cars(dealer.0.dealer_id)
        .await
        .map_err(map_car_error)?;

    // An empty inventory is reported as not-found
    if cars.is_empty() {
        return Err(ApiError::not_found(format!(
            "No cars found for dealer {}",
            dealer.0.dealer_id
        )));
    }

    Ok(Json(cars))
}

/// GET /api/cars/search - Search the caller's inventory by make and model
async fn search_cars(
    State(state): State<AppState>,
    dealer: AuthenticatedDealer,
    Query(query): Query<MakeModelQuery>,
) -> Result<Json<Vec<Car>>, ApiError> {
    let cars = state
        .car_service
        .search_cars(dealer.0.dealer_id, &query.make, &query.model)
        .await
        .map_err(map_car_error)?;

    if cars.is_empty() {
        return Err(ApiError::not_found(format!(
            "No cars found for dealer {} with make {} and model {}",
            dealer.0.dealer_id, query.make, query.model
        )));
    }

    Ok(Json(cars))
}

/// GET /api/cars/stock - Stock level for a make/model pair
///
/// Zero stock is a normal result, not an error.
async fn stock_levels(
    State(state): State<AppState>,
    dealer: AuthenticatedDealer,
    Query(query): Query<MakeModelQuery>,
) -> Result<Json<StockLevel>, ApiError> {
    let stock = state
        .car_service
        .stock_level(dealer.0.dealer_id, &query.make, &query.model)
        .await
        .map_err(map_car_error)?;

    Ok(Json(stock))
}
