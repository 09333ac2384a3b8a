//! HTTP routes for the User API.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::middleware::{http_metrics_middleware, require_auth, AuthState};
use crate::repositories::credentials::{CredentialStore, StaticCredentialStore};
use crate::repositories::users::UserDirectory;
use axum::{
    error_handling::HandleErrorLayer,
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Upper bound on the time spent producing a response.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state shared across all handlers.
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Credential lookup for login.
    pub credentials: Arc<dyn CredentialStore>,

    /// The user records.
    pub users: UserDirectory,

    /// When the process started serving; reported by `/health`.
    pub started_at: Instant,
}

impl AppState {
    /// State with the seeded credential store and user directory.
    pub fn new(config: Config) -> Self {
        Self::with_stores(
            config,
            Arc::new(StaticCredentialStore::seeded()),
            UserDirectory::seeded(),
        )
    }

    pub fn with_stores(
        config: Config,
        credentials: Arc<dyn CredentialStore>,
        users: UserDirectory,
    ) -> Self {
        Self {
            config,
            credentials,
            users,
            started_at: Instant::now(),
        }
    }
}

/// Build the application routes.
///
/// - `/health` - liveness, public
/// - `/metrics` - Prometheus scrape, public
/// - `/auth/login` - public
/// - `/auth/refresh` - bearer token required
/// - `/users`, `/users/:id` - bearer token required, DELETE admin only
/// - anything else - 404 `{"error": "Route not found"}`
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let auth_state = Arc::new(AuthState {
        jwt_secret: state.config.jwt_secret.clone(),
    });

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route(
            "/health",
            get(handlers::health_check).fallback(handlers::route_not_found),
        )
        .route(
            "/auth/login",
            post(handlers::login).fallback(handlers::route_not_found),
        )
        .with_state(state.clone());

    // Metrics route with its own state
    let metrics_routes = Router::new()
        .route(
            "/metrics",
            get(handlers::metrics_handler).fallback(handlers::route_not_found),
        )
        .with_state(metrics_handle);

    // Protected routes (authentication required)
    let protected_routes = Router::new()
        .route(
            "/auth/refresh",
            post(handlers::refresh).fallback(handlers::route_not_found),
        )
        .route(
            "/users",
            get(handlers::list_users)
                .post(handlers::create_user)
                .fallback(handlers::route_not_found),
        )
        .route(
            "/users/:id",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user)
                .fallback(handlers::route_not_found),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
        .with_state(state);

    let routes = public_routes
        .merge(metrics_routes)
        .merge(protected_routes)
        .fallback(handlers::route_not_found);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - Timeout the request, 408 `{error}` body (innermost)
    // 2. TraceLayer - Log request details
    // 3. CorsLayer - Permissive CORS, answers preflights
    // 4. http_metrics_middleware - Record ALL responses (outermost)
    with_request_timeout(routes, REQUEST_TIMEOUT)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(http_metrics_middleware))
}

/// Abort requests that run longer than `timeout` with a 408 error body.
fn with_request_timeout(router: Router, timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handlers::middleware_error))
            .layer(TimeoutLayer::new(timeout)),
    )
}
