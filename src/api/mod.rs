//! API layer - HTTP handlers and routing
//!
//! Everything except login sits behind the authentication middleware, so an
//! unauthenticated request is rejected before any handler or store access.

pub mod cars;
pub mod dealers;
pub mod middleware;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthenticatedDealer};

/// Build the API router (everything under /api)
pub fn build_api_router(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .route("/dealers/logout", post(dealers::logout))
        .route("/dealers/currentuser", get(dealers::current_user))
        .nest("/cars", cars::router())
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::require_auth,
        ));

    Router::new()
        .route("/dealers/login", post(dealers::login))
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);
    let cors = match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            tracing::warn!(cors_origin, "Invalid CORS origin, allowing none");
            cors
        }
    };

    Router::new()
        .nest("/api", build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
