//! Observability for the User API.
//!
//! # Privacy by Default
//!
//! Instrumentation uses `#[instrument(skip_all)]` with explicitly allow-listed
//! fields. Fields fall into three groups:
//! - **SAFE**: logged in plaintext (roles, user ids, operation names)
//! - **HASHED**: SHA-256 hashed for correlation (emails)
//! - **NEVER**: never logged (passwords, tokens, the signing secret)

pub mod metrics;

use crate::errors::ApiError;
use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars)
///
/// Used for emails, which need correlation across log entries but should not
/// be stored in plaintext. Not a security boundary.
pub fn hash_for_correlation(value: &str) -> String {
    let result = Sha256::digest(value.as_bytes());
    // First 4 bytes: enough for correlation, limits reversibility
    hex::encode(result.get(..4).unwrap_or_default())
}

/// Error categories for metrics labels (bounded cardinality)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing, invalid or expired credentials or tokens
    Authentication,
    /// Wrong role
    Authorization,
    /// Missing or malformed input
    Validation,
    NotFound,
    /// Uniqueness violation
    Conflict,
    Timeout,
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Authorization => "authorization",
            ErrorCategory::Validation => "validation",
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::Conflict => "conflict",
            ErrorCategory::Timeout => "timeout",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl From<&ApiError> for ErrorCategory {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::Unauthorized(_) => ErrorCategory::Authentication,
            ApiError::Forbidden(_) => ErrorCategory::Authorization,
            ApiError::Validation(_) => ErrorCategory::Validation,
            ApiError::NotFound(_) => ErrorCategory::NotFound,
            ApiError::Conflict(_) => ErrorCategory::Conflict,
            ApiError::Timeout => ErrorCategory::Timeout,
            ApiError::Internal => ErrorCategory::Internal,
        }
    }
}
