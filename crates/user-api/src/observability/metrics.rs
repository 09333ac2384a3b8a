//! Metrics definitions for the User API
//!
//! All metrics follow Prometheus naming conventions:
//! - `user_api_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `method`: HTTP methods
//! - `endpoint`: normalized route templates, unknown paths collapse to `/other`
//! - `flow`: login, refresh
//! - `status`: success, error (plus operation-specific outcomes)
//! - `error_category`: see `ErrorCategory`
//! - `operation`: list, get, create, update, delete

use super::ErrorCategory;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize the Prometheus recorder and return the handle used to render
/// `/metrics`.
///
/// # Errors
///
/// Returns error if the recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("user_api_http_request".to_string()),
            &[
                0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.200, 0.500, 1.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("user_api_token_issuance".to_string()),
            &[0.0005, 0.001, 0.002, 0.005, 0.010, 0.025, 0.050],
        )
        .map_err(|e| format!("Failed to set token issuance buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

/// Build a recorder handle without installing it globally.
///
/// Used when a recorder is already installed in the process (tests spawning
/// several servers).
pub fn standalone_metrics_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `user_api_http_requests_total`, `user_api_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status`
pub fn record_http_request(method: &str, path: &str, status_code: u16, duration: Duration) {
    let endpoint = normalize_endpoint(path);
    let status = categorize_status_code(status_code);

    histogram!("user_api_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => endpoint,
        "status" => status
    )
    .record(duration.as_secs_f64());

    counter!("user_api_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Replace the `:id` segment of user routes with a placeholder.
fn normalize_endpoint(path: &str) -> &'static str {
    match path {
        "/health" => "/health",
        "/metrics" => "/metrics",
        "/auth/login" => "/auth/login",
        "/auth/refresh" => "/auth/refresh",
        "/users" => "/users",
        _ => match path.strip_prefix("/users/") {
            Some(rest) if !rest.is_empty() && !rest.contains('/') => "/users/{id}",
            _ => "/other",
        },
    }
}

// ============================================================================
// Token Metrics
// ============================================================================

/// Record token issuance duration and outcome
///
/// Metric: `user_api_token_issuance_duration_seconds`, `user_api_token_issuance_total`
/// Labels: `flow`, `status`
pub fn record_token_issuance(flow: &str, status: &str, duration: Duration) {
    histogram!("user_api_token_issuance_duration_seconds", "flow" => flow.to_string(), "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("user_api_token_issuance_total", "flow" => flow.to_string(), "status" => status.to_string())
        .increment(1);
}

/// Record token validation result
///
/// Metric: `user_api_token_validations_total`
/// Labels: `status`, `error_category`
pub fn record_token_validation(status: &str, error_category: Option<&str>) {
    let category = error_category.unwrap_or("none");
    counter!("user_api_token_validations_total", "status" => status.to_string(), "error_category" => category.to_string())
        .increment(1);
}

// ============================================================================
// Directory Metrics
// ============================================================================

/// Record a user directory operation
///
/// Metric: `user_api_directory_operations_total`
/// Labels: `operation`, `status`
pub fn record_directory_operation(operation: &str, status: &str) {
    counter!("user_api_directory_operations_total", "operation" => operation.to_string(), "status" => status.to_string())
        .increment(1);
}

/// Update the number of records in the directory
///
/// Metric: `user_api_directory_users`
pub fn set_directory_size(count: usize) {
    gauge!("user_api_directory_users").set(count as f64);
}

// ============================================================================
// Error Metrics
// ============================================================================

/// Record an error response
///
/// Metric: `user_api_errors_total`
/// Labels: `error_category`, `status_code`
pub fn record_error(category: ErrorCategory, status_code: u16) {
    counter!("user_api_errors_total",
        "error_category" => category.as_str(),
        "status_code" => status_code.to_string()
    )
    .increment(1);
}
