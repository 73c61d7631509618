//! End-to-end API tests
//!
//! Each test spins up the full router against a fresh in-memory database
//! with two seeded dealers, then drives it over HTTP.

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::json;

use carstock::api::{build_router, AppState};
use carstock::db::repositories::{
    DealerRepository, SqlxCarRepository, SqlxDealerRepository, SqlxSessionTokenRepository,
};
use carstock::db::{create_test_pool, migrations};
use carstock::models::{Car, Dealer, StockLevel};
use carstock::services::assertion::AssertionSigner;
use carstock::services::password::hash_password;
use carstock::services::{AuthService, CarService};

const DEALER_A: &str = "Velocity Motors";
const DEALER_B: &str = "Apex Autos";
const PASSWORD: &str = "password123";

async fn spawn_server() -> TestServer {
    let pool = create_test_pool().await.expect("Failed to create test pool");
    migrations::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let dealers = SqlxDealerRepository::new(pool.clone());
    for name in [DEALER_A, DEALER_B] {
        dealers
            .create(&Dealer::new(name.to_string(), hash_password(PASSWORD).unwrap()))
            .await
            .expect("Failed to seed dealer");
    }

    let state = AppState {
        auth_service: Arc::new(AuthService::new(
            SqlxDealerRepository::boxed(pool.clone()),
            SqlxSessionTokenRepository::boxed(pool.clone()),
            AssertionSigner::new(b"integration-test-secret"),
        )),
        car_service: Arc::new(CarService::new(SqlxCarRepository::boxed(pool.clone()))),
    };

    TestServer::new(build_router(state, "http://localhost:3000"))
        .expect("Failed to start test server")
}

async fn login(server: &TestServer, name: &str) -> String {
    let response = server
        .post("/api/dealers/login")
        .json(&json!({ "name": name, "password": PASSWORD }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    body["token"].as_str().expect("Login should return a token").to_string()
}

async fn add_car(server: &TestServer, token: &str, make: &str, model: &str, plate: &str) -> Car {
    let response = server
        .post("/api/cars")
        .authorization_bearer(token)
        .json(&json!({
            "make": make,
            "model": model,
            "year": 2020,
            "number_plate": plate,
        }))
        .await;
    response.assert_status_ok();
    response.json()
}

#[tokio::test]
async fn test_login_success_sets_cookie_and_returns_token() {
    let server = spawn_server().await;

    let response = server
        .post("/api/dealers/login")
        .json(&json!({ "name": DEALER_A, "password": PASSWORD }))
        .await;
    response.assert_status_ok();

    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("Login should set the session cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("session="));
    assert!(set_cookie.contains("HttpOnly"));

    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Login successful");
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let server = spawn_server().await;

    for (name, password) in [(DEALER_A, "wrong"), ("No Such Dealer", PASSWORD)] {
        let response = server
            .post("/api/dealers/login")
            .json(&json!({ "name": name, "password": password }))
            .await;
        response.assert_status_unauthorized();

        let body: serde_json::Value = response.json();
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
        assert_eq!(body["error"]["message"], "Invalid credentials");
    }
}

#[tokio::test]
async fn test_login_empty_fields_rejected() {
    let server = spawn_server().await;

    let response = server
        .post("/api/dealers/login")
        .json(&json!({ "name": "", "password": PASSWORD }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_unauthenticated_requests_rejected() {
    let server = spawn_server().await;

    for path in ["/api/cars", "/api/cars/search", "/api/cars/stock", "/api/dealers/currentuser"] {
        let response = server.get(path).await;
        response.assert_status_unauthorized();
    }

    let response = server
        .post("/api/cars")
        .json(&json!({ "make": "BMW", "model": "X5", "year": 2020, "number_plate": "AB12CDE" }))
        .await;
    response.assert_status_unauthorized();

    // Garbage assertion is rejected the same way
    let response = server
        .get("/api/cars")
        .authorization_bearer("not-a-real-assertion")
        .await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_current_user() {
    let server = spawn_server().await;
    let token = login(&server, DEALER_A).await;

    let response = server
        .get("/api/dealers/currentuser")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["name"], DEALER_A);
}

#[tokio::test]
async fn test_cookie_authentication() {
    let server = spawn_server().await;
    let token = login(&server, DEALER_A).await;

    let cookie = axum::http::HeaderValue::from_str(&format!("session={}", token)).unwrap();
    let response = server
        .get("/api/dealers/currentuser")
        .add_header(axum::http::header::COOKIE, cookie)
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let server = spawn_server().await;
    let token = login(&server, DEALER_A).await;

    let response = server
        .post("/api/dealers/logout")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();

    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("Logout should clear the session cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_add_and_list_cars() {
    let server = spawn_server().await;
    let token = login(&server, DEALER_A).await;

    let car = add_car(&server, &token, "BMW", "X5", "AB12CDE").await;
    assert!(car.id > 0);
    assert_eq!(car.make, "BMW");

    let response = server.get("/api/cars").authorization_bearer(&token).await;
    response.assert_status_ok();

    let cars: Vec<Car> = response.json();
    assert_eq!(cars.len(), 1);
    assert_eq!(cars[0].number_plate, "AB12CDE");
}

#[tokio::test]
async fn test_empty_inventory_is_not_found() {
    let server = spawn_server().await;
    let token = login(&server, DEALER_A).await;

    let response = server.get("/api/cars").authorization_bearer(&token).await;
    response.assert_status_not_found();

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_add_car_validation() {
    let server = spawn_server().await;
    let token = login(&server, DEALER_A).await;

    let response = server
        .post("/api/cars")
        .authorization_bearer(&token)
        .json(&json!({ "make": "", "model": "X5", "year": 2020, "number_plate": "AB12CDE" }))
        .await;
    response.assert_status_bad_request();

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_remove_car() {
    let server = spawn_server().await;
    let token = login(&server, DEALER_A).await;
    let car = add_car(&server, &token, "BMW", "X5", "AB12CDE").await;

    let response = server
        .delete(&format!("/api/cars/{}", car.id))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(
        body["message"],
        format!("Car with ID {} successfully removed.", car.id)
    );

    // Gone afterwards, and a second delete is not-found
    let response = server
        .delete(&format!("/api/cars/{}", car.id))
        .authorization_bearer(&token)
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_inventories_are_isolated_between_dealers() {
    let server = spawn_server().await;
    let token_a = login(&server, DEALER_A).await;
    let token_b = login(&server, DEALER_B).await;

    let car = add_car(&server, &token_a, "BMW", "X5", "AB12CDE").await;

    // Dealer B sees an empty inventory
    let response = server.get("/api/cars").authorization_bearer(&token_b).await;
    response.assert_status_not_found();

    let response = server
        .get("/api/cars/search")
        .add_query_param("make", "BMW")
        .add_query_param("model", "X5")
        .authorization_bearer(&token_b)
        .await;
    response.assert_status_not_found();

    // Dealer B cannot remove dealer A's car, and cannot tell it exists
    let response = server
        .delete(&format!("/api/cars/{}", car.id))
        .authorization_bearer(&token_b)
        .await;
    response.assert_status_not_found();

    // The car is still in dealer A's inventory
    let response = server.get("/api/cars").authorization_bearer(&token_a).await;
    response.assert_status_ok();
    let cars: Vec<Car> = response.json();
    assert_eq!(cars.len(), 1);
}

#[tokio::test]
async fn test_search_cars() {
    let server = spawn_server().await;
    let token = login(&server, DEALER_A).await;

    add_car(&server, &token, "BMW", "X5", "AB12CDE").await;
    add_car(&server, &token, "BMW", "X3", "CD34EFG").await;

    let response = server
        .get("/api/cars/search")
        .add_query_param("make", "BMW")
        .add_query_param("model", "X5")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();

    let cars: Vec<Car> = response.json();
    assert_eq!(cars.len(), 1);
    assert_eq!(cars[0].model, "X5");

    // No match is not-found
    let response = server
        .get("/api/cars/search")
        .add_query_param("make", "Audi")
        .add_query_param("model", "A4")
        .authorization_bearer(&token)
        .await;
    response.assert_status_not_found();

    // Missing parameters are a validation error
    let response = server
        .get("/api/cars/search")
        .add_query_param("make", "BMW")
        .authorization_bearer(&token)
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_stock_levels() {
    let server = spawn_server().await;
    let token = login(&server, DEALER_A).await;

    add_car(&server, &token, "BMW", "X5", "AB12CDE").await;

    let response = server
        .get("/api/cars/stock")
        .add_query_param("make", "BMW")
        .add_query_param("model", "X5")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();

    let stock: StockLevel = response.json();
    assert_eq!(stock.stock_level, 1);

    // Zero stock is a normal result, not an error
    let response = server
        .get("/api/cars/stock")
        .add_query_param("make", "Audi")
        .add_query_param("model", "A4")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();

    let stock: StockLevel = response.json();
    assert_eq!(stock, StockLevel::empty("Audi", "A4"));
}

#[tokio::test]
async fn test_relogin_keeps_previous_assertion_usable() {
    let server = spawn_server().await;
    let first = login(&server, DEALER_A).await;
    let second = login(&server, DEALER_A).await;
    assert_ne!(first, second);

    for token in [&first, &second] {
        let response = server
            .get("/api/dealers/currentuser")
            .authorization_bearer(token)
            .await;
        response.assert_status_ok();
    }
}
