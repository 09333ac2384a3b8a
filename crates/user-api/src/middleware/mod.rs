//! HTTP middleware layers.
//!
//! - `auth` - bearer token verification for protected routes, role checks
//! - `http_metrics` - request metrics for every response

pub mod auth;
pub mod http_metrics;

pub use auth::{require_auth, require_role, AuthState};
pub use http_metrics::http_metrics_middleware;
