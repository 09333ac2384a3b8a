//! JWT utilities shared by the service and its test harness.
//!
//! - Size limit applied before any parsing
//! - Bearer scheme parsing for the `Authorization` header
//! - Strict `exp` validation (no leeway, no clock skew tolerance, millisecond
//!   precision)
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Every error renders the same generic message; the specific reason is
//!   logged at debug level only

use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed JWT size in bytes (8KB).
///
/// A typical HS256 token carrying email, role and name is well under 400
/// bytes. Oversized tokens are rejected before base64 decoding or HMAC work.
pub const MAX_JWT_SIZE_BYTES: usize = 8192; // 8KB

/// Literal prefix of the bearer scheme in the `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Token type reported to clients alongside issued tokens.
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during JWT validation.
///
/// Messages are intentionally identical to avoid telling a caller which check
/// failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token size exceeds maximum allowed.
    #[error("Invalid or expired token")]
    TokenTooLarge,

    /// Token format, algorithm or signature is invalid.
    #[error("Invalid or expired token")]
    MalformedToken,

    /// Current time is at or past the `exp` claim.
    #[error("Invalid or expired token")]
    Expired,
}

// =============================================================================
// Functions
// =============================================================================

/// Extract the token from an `Authorization` header value.
///
/// Returns `None` unless the value starts with the exact `Bearer ` prefix and
/// carries a non-empty token after it.
#[must_use]
pub fn extract_bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Reject tokens larger than [`MAX_JWT_SIZE_BYTES`].
///
/// # Errors
///
/// Returns `JwtValidationError::TokenTooLarge` for oversized tokens.
pub fn check_token_size(token: &str) -> Result<(), JwtValidationError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtValidationError::TokenTooLarge);
    }
    Ok(())
}

/// Convert a Unix timestamp in milliseconds into a JWT NumericDate.
///
/// NumericDate (RFC 7519) may carry a fractional part; tokens issued here use
/// millisecond precision so that `exp - iat` is exactly the granted lifetime.
#[must_use]
#[allow(clippy::cast_precision_loss)] // millisecond timestamps stay below 2^53
pub fn numeric_date_from_millis(millis: i64) -> f64 {
    millis as f64 / 1000.0
}

/// Current time as a millisecond-precision NumericDate.
#[must_use]
pub fn now_numeric_date() -> f64 {
    numeric_date_from_millis(chrono::Utc::now().timestamp_millis())
}

/// Validate the `exp` claim against the current time.
///
/// A token is expired once the current time reaches `exp`. There is no
/// leeway, and the comparison keeps millisecond precision.
///
/// # Errors
///
/// Returns `JwtValidationError::Expired` when `now >= exp`.
pub fn validate_exp(exp: f64) -> Result<(), JwtValidationError> {
    validate_exp_at(exp, now_numeric_date())
}

/// Deterministic `exp` validation against an explicit `now` NumericDate.
///
/// Prefer [`validate_exp`] in production code. This variant exists so that
/// the boundary can be unit-tested without wall-clock dependence.
///
/// # Errors
///
/// Returns `JwtValidationError::Expired` when `now >= exp` or when `exp` is
/// not a finite number.
pub fn validate_exp_at(exp: f64, now: f64) -> Result<(), JwtValidationError> {
    if !exp.is_finite() || now >= exp {
        tracing::debug!(
            target: "common.jwt",
            exp = exp,
            now = now,
            "Token rejected: expired"
        );
        return Err(JwtValidationError::Expired);
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
