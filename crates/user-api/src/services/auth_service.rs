//! Login and refresh flows.
//!
//! Both end in [`token_service::issue_token`]; they differ in where the
//! identity comes from (credential store vs. an already verified token) and
//! which lifetime applies.

use crate::crypto::Claims;
use crate::errors::ApiError;
use crate::models::{Identity, TokenResponse};
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_token_issuance;
use crate::repositories::credentials::CredentialStore;
use crate::services::token_service;
use common::secret::SecretString;
use std::time::Instant;
use tracing::instrument;

/// Exchange email and password for a token.
///
/// `exp_override_sec` replaces the default lifetime when present and
/// non-zero. Unknown email and wrong password produce the same error.
#[instrument(skip_all, name = "user_api.auth.login")]
pub async fn login(
    credentials: &dyn CredentialStore,
    secret: &SecretString,
    default_ttl_seconds: u64,
    email: &str,
    password: &str,
    exp_override_sec: Option<u64>,
) -> Result<TokenResponse, ApiError> {
    let start = Instant::now();

    let Some(identity) = credentials.verify(email, password).await else {
        tracing::info!(
            target: "user_api.auth",
            email_hash = %hash_for_correlation(email),
            "Login rejected"
        );
        record_token_issuance("login", "error", start.elapsed());
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    };

    let ttl_seconds = match exp_override_sec {
        Some(seconds) if seconds > 0 => seconds,
        _ => default_ttl_seconds,
    };

    let result = token_service::issue_token(&identity, secret, ttl_seconds);
    record_token_issuance("login", status_label(&result), start.elapsed());

    if result.is_ok() {
        tracing::info!(
            target: "user_api.auth",
            email_hash = %hash_for_correlation(email),
            role = %identity.role,
            ttl_seconds,
            "Token issued"
        );
    }

    result
}

/// Issue a fresh token for the holder of a currently valid one.
///
/// The claims are reused as-is with the default lifetime; the credential
/// store is not consulted again.
#[instrument(skip_all, name = "user_api.auth.refresh")]
pub fn refresh(
    claims: &Claims,
    secret: &SecretString,
    default_ttl_seconds: u64,
) -> Result<TokenResponse, ApiError> {
    let start = Instant::now();

    let identity = Identity {
        email: claims.email.clone(),
        role: claims.role,
        name: claims.name.clone(),
    };

    let result = token_service::issue_token(&identity, secret, default_ttl_seconds);
    record_token_issuance("refresh", status_label(&result), start.elapsed());

    if result.is_ok() {
        tracing::debug!(
            target: "user_api.auth",
            email_hash = %hash_for_correlation(&claims.email),
            "Token refreshed"
        );
    }

    result
}

fn status_label<T>(result: &Result<T, ApiError>) -> &'static str {
    if result.is_ok() {
        "success"
    } else {
        "error"
    }
}
