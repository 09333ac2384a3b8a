use crate::errors::ApiError;
use axum::BoxError;
use tower::timeout::error::Elapsed;

/// Any path or method with no route.
pub async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

/// Turn a failure from the service middleware stack into an `{error}` body.
pub async fn middleware_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        tracing::warn!(target: "user_api.handlers", "Request timed out");
        return ApiError::Timeout;
    }

    tracing::error!(target: "user_api.handlers", error = %err, "Unhandled middleware error");
    ApiError::Internal
}
