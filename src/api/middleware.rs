//! API middleware
//!
//! Authentication middleware, the shared application state, and the uniform
//! JSON error envelope. Identity resolution happens here, before any handler
//! (and therefore before any store access) runs.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::services::assertion::IdentityClaims;
use crate::services::{AuthService, CarService};

/// Session cookie name
pub const SESSION_COOKIE: &str = "session";

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub car_service: Arc<CarService>,
}

/// Authenticated dealer identity extracted from the request's assertion
#[derive(Debug, Clone)]
pub struct AuthenticatedDealer(pub IdentityClaims);

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

/// Extract the identity assertion from the request
fn extract_assertion(request: &Request) -> Option<String> {
    if let Some(auth_header) = request.headers().get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    if let Some(cookie_header) = request.headers().get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(token) = cookie.strip_prefix("session=") {
                    return Some(token.to_string());
                }
            }
        }
    }

    None
}

/// Authentication middleware
///
/// Resolves the inbound assertion (stateless signature + expiry check),
/// inserts [`AuthenticatedDealer`] for handlers, and performs sliding
/// renewal: once more than half the validity window has elapsed, a refreshed
/// cookie rides along on the response.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let assertion = extract_assertion(&request)
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let claims = state
        .auth_service
        .resolve_identity(&assertion)
        .map_err(|_| ApiError::unauthorized("Invalid or expired session"))?;

    let renewed = state.auth_service.renew(&claims).map_err(|e| {
        tracing::error!(error = %e, "Failed to renew identity assertion");
        ApiError::internal_error("An internal error occurred")
    })?;

    request.extensions_mut().insert(AuthenticatedDealer(claims));
    let mut response = next.run(request).await;

    if let Some(assertion) = renewed {
        let max_age = state.auth_service.session_expiration_days() * 24 * 60 * 60;
        if let Ok(value) = HeaderValue::from_str(&session_cookie(&assertion, max_age)) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    Ok(response)
}

/// Build the session cookie carrying an assertion
pub fn session_cookie(assertion: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, assertion, max_age_secs
    )
}

/// Cookie that instructs the client to drop its assertion
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

impl<S> FromRequestParts<S> for AuthenticatedDealer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedDealer>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_bearer(token: &str) -> Request<Body> {
        Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    fn request_with_cookie(token: &str) -> Request<Body> {
        Request::builder()
            .uri("/test")
            .header(header::COOKIE, format!("session={}", token))
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_extract_assertion_from_bearer() {
        let request = request_with_bearer("assertion-123");
        assert_eq!(extract_assertion(&request), Some("assertion-123".to_string()));
    }

    #[test]
    fn test_extract_assertion_from_cookie() {
        let request = request_with_cookie("assertion-456");
        assert_eq!(extract_assertion(&request), Some("assertion-456".to_string()));
    }

    #[test]
    fn test_extract_assertion_bearer_priority() {
        let request = Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, "Bearer bearer-token")
            .header(header::COOKIE, "session=cookie-token")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_assertion(&request), Some("bearer-token".to_string()));
    }

    #[test]
    fn test_extract_assertion_none() {
        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        assert!(extract_assertion(&request).is_none());
    }

    #[test]
    fn test_extract_assertion_ignores_other_schemes() {
        let request = Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, "Basic invalid")
            .body(Body::empty())
            .unwrap();
        assert!(extract_assertion(&request).is_none());
    }

    #[test]
    fn test_api_error_codes() {
        assert_eq!(ApiError::unauthorized("x").error.code, "UNAUTHORIZED");
        assert_eq!(ApiError::not_found("x").error.code, "NOT_FOUND");
        assert_eq!(ApiError::validation_error("x").error.code, "VALIDATION_ERROR");
        assert_eq!(ApiError::internal_error("x").error.code, "INTERNAL_ERROR");
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc", 604800);
        assert!(cookie.starts_with("session=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=604800"));

        let clear = clear_session_cookie();
        assert!(clear.contains("Max-Age=0"));
    }
}
