//! HTTP request handlers.

pub mod auth;
pub mod fallback;
pub mod health;
pub mod metrics;
pub mod users;

pub use auth::{login, refresh};
pub use fallback::{middleware_error, route_not_found};
pub use health::health_check;
pub use metrics::metrics_handler;
pub use users::{create_user, delete_user, get_user, list_users, update_user};
