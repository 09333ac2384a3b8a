use crate::observability::{metrics::record_error, ErrorCategory};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::jwt::JwtValidationError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed, invalid or expired credential or token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the role does not permit the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or malformed required input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Uniqueness violation.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The response was not produced within the request timeout.
    #[error("Request timed out")]
    Timeout,

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the client. Internal details never leave the process.
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Unauthorized(message)
            | ApiError::Forbidden(message)
            | ApiError::NotFound(message)
            | ApiError::Validation(message)
            | ApiError::Conflict(message) => message.clone(),
            ApiError::Timeout => "Request timed out".to_string(),
            ApiError::Internal => "An internal error occurred".to_string(),
        }
    }
}

/// Every error body is `{"error": "<message>"}`.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        record_error(ErrorCategory::from(&self), status.as_u16());

        let error_response = ErrorResponse {
            error: self.client_message(),
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<JwtValidationError> for ApiError {
    fn from(err: JwtValidationError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

/// Body parse failures keep the `{error}` shape instead of axum's plain text.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(target: "user_api.errors", error = %rejection, "Rejected request body");
        ApiError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}
