//! Access control for protected routes.
//!
//! - `require_auth` - bearer extraction and verification, run as route middleware
//! - `require_role` - exact role check called by handlers
//!
//! On success the verified [`Claims`] are inserted into request extensions, so
//! handlers read them with `Extension<Claims>`. On failure the request never
//! reaches the handler or the user directory.

use crate::crypto::Claims;
use crate::errors::ApiError;
use crate::models::Role;
use crate::services::token_service;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::IntoResponse,
};
use common::jwt;
use common::secret::SecretString;
use std::sync::Arc;
use tracing::instrument;

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    /// Secret that verifies every token this service issued.
    pub jwt_secret: SecretString,
}

fn missing_header() -> ApiError {
    ApiError::Unauthorized("Missing or invalid Authorization header".to_string())
}

/// Extract the bearer token from the Authorization header.
fn extract_bearer_token(req: &Request) -> Result<&str, ApiError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::debug!(target: "user_api.middleware.auth", "Missing Authorization header");
            missing_header()
        })?;

    jwt::extract_bearer_token(auth_header).ok_or_else(|| {
        tracing::debug!(target: "user_api.middleware.auth", "Invalid Authorization header format");
        missing_header()
    })
}

/// Authentication middleware.
///
/// # Response
///
/// - Returns 401 Unauthorized if the header is missing, not `Bearer`, or the
///   token fails verification
/// - Continues to the next handler with `Claims` in extensions otherwise
#[instrument(skip_all, name = "user_api.middleware.auth")]
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_bearer_token(&req)?;

    let claims = token_service::verify_token(token, &state.jwt_secret)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Require the caller to hold exactly `required`. There is no role hierarchy.
pub fn require_role(claims: &Claims, required: Role) -> Result<(), ApiError> {
    if claims.role == required {
        return Ok(());
    }

    tracing::debug!(
        target: "user_api.middleware.auth",
        required = %required,
        actual = %claims.role,
        "Role check failed"
    );
    Err(ApiError::Forbidden(format!(
        "Forbidden: {} role required",
        required
    )))
}
