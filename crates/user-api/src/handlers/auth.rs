//! Login and refresh handlers.

use crate::crypto::Claims;
use crate::errors::ApiError;
use crate::models::TokenResponse;
use crate::routes::AppState;
use crate::services::auth_service;
use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap},
    Extension, Json,
};
use common::secret::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<SecretString>,
    /// Lifetime override in seconds; absent or 0 means the configured default.
    #[serde(default, rename = "expOverrideSec")]
    pub exp_override_sec: Option<u64>,
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Read the login body.
///
/// An empty body, or one not declared as JSON, yields a request with no
/// fields. Only a JSON body that fails to parse is a 400.
fn parse_login_body(headers: &HeaderMap, body: &[u8]) -> Result<LoginRequest, ApiError> {
    if !is_json_content_type(headers) || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(LoginRequest::default());
    }

    let Json(request) = Json::<LoginRequest>::from_bytes(body)?;
    Ok(request)
}

/// Handle login
///
/// POST /auth/login
///
/// A missing email or password is treated like a wrong one (401), not as a
/// malformed request.
#[tracing::instrument(skip_all, name = "user_api.handlers.login")]
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TokenResponse>, ApiError> {
    let payload = parse_login_body(&headers, &body)?;

    let (Some(email), Some(password)) = (payload.email.as_deref(), payload.password.as_ref())
    else {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    };

    let token = auth_service::login(
        state.credentials.as_ref(),
        &state.config.jwt_secret,
        state.config.token_ttl_seconds,
        email,
        password.expose_secret(),
        payload.exp_override_sec,
    )
    .await?;

    Ok(Json(token))
}

/// Handle refresh
///
/// POST /auth/refresh (bearer token required)
#[tracing::instrument(skip_all, name = "user_api.handlers.refresh")]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = auth_service::refresh(
        &claims,
        &state.config.jwt_secret,
        state.config.token_ttl_seconds,
    )?;

    Ok(Json(token))
}
