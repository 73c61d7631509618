//! Dealer authentication endpoints
//!
//! - POST /api/dealers/login - Dealer login
//! - POST /api/dealers/logout - Dealer logout (clears the client assertion)
//! - GET /api/dealers/currentuser - Current dealer's name

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{
    clear_session_cookie, session_cookie, ApiError, AppState, AuthenticatedDealer,
};
use crate::services::AuthError;

/// Request body for dealer login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
}

/// Response for successful login
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    /// The signed identity assertion, also set as the session cookie.
    /// Non-browser clients send it back as `Authorization: Bearer`.
    pub token: String,
}

/// Response for the current-user endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    pub name: String,
}

/// POST /api/dealers/login - Dealer login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .auth_service
        .login(&body.name, &body.password)
        .await
        .map_err(|e| match e {
            AuthError::InvalidCredentials => ApiError::unauthorized("Invalid credentials"),
            AuthError::ValidationError(msg) => ApiError::validation_error(msg),
            other => {
                tracing::error!(error = %other, "Login failed");
                ApiError::internal_error("An internal error occurred")
            }
        })?;

    let max_age = state.auth_service.session_expiration_days() * 24 * 60 * 60;
    let cookie = session_cookie(&session.assertion, max_age);

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        headers.insert(header::SET_COOKIE, value);
    }

    Ok((
        headers,
        Json(LoginResponse {
            message: "Login successful".to_string(),
            token: session.assertion,
        }),
    ))
}

/// POST /api/dealers/logout - Dealer logout
///
/// Clears the client-held assertion. The server-side token row is left in
/// place on purpose; it is superseded by the next login or swept once
/// expired.
pub async fn logout(_dealer: AuthenticatedDealer) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&clear_session_cookie()) {
        headers.insert(header::SET_COOKIE, value);
    }

    (
        headers,
        Json(serde_json::json!({ "message": "Logout successful" })),
    )
}

/// GET /api/dealers/currentuser - Current dealer's name
pub async fn current_user(dealer: AuthenticatedDealer) -> Json<CurrentUserResponse> {
    Json(CurrentUserResponse {
        name: dealer.0.name,
    })
}
