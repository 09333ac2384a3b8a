//! Test server harness for E2E testing
//!
//! Provides TestApiServer for spawning real User API instances in tests.

use crate::fixtures::{TEST_JWT_SECRET, TEST_TOKEN_TTL_SECONDS};
use common::secret::SecretString;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use user_api::config::Config;
use user_api::models::TokenResponse;
use user_api::observability::metrics::{init_metrics_recorder, standalone_metrics_handle};
use user_api::routes::{self, AppState};

/// Test harness for spawning the User API in E2E tests
///
/// Every instance has its own seeded credential store and user directory.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_list_users() -> Result<(), anyhow::Error> {
///     let server = TestApiServer::spawn().await?;
///     let token = server.login_token(USER_EMAIL, SEED_PASSWORD).await?;
///
///     let response = server
///         .client()
///         .get(format!("{}/users", server.url()))
///         .bearer_auth(&token)
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestApiServer {
    addr: SocketAddr,
    state: Arc<AppState>,
    client: reqwest::Client,
    handle: JoinHandle<()>,
}

impl TestApiServer {
    /// Spawn a server signing with [`TEST_JWT_SECRET`] and the default lifetime
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_ttl(TEST_TOKEN_TTL_SECONDS).await
    }

    /// Spawn a server whose default token lifetime is `token_ttl_seconds`
    pub async fn spawn_with_ttl(token_ttl_seconds: u64) -> Result<Self, anyhow::Error> {
        let config = Config {
            bind_address: "127.0.0.1:0".to_string(),
            jwt_secret: SecretString::from(TEST_JWT_SECRET),
            token_ttl_seconds,
            json_logs: false,
        };

        Self::spawn_with_config(config).await
    }

    /// Spawn a server from an explicit configuration
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0), ignoring `bind_address`
    /// - Seed the credential store and user directory
    /// - Start the HTTP server in the background
    pub async fn spawn_with_config(config: Config) -> Result<Self, anyhow::Error> {
        let state = Arc::new(AppState::new(config));

        // The global recorder can only be installed once per process; later
        // servers get a standalone one
        let metrics_handle = match init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => standalone_metrics_handle(),
        };

        // Build routes using the service's real route builder
        let app = routes::build_routes(state.clone(), metrics_handle);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        // Spawn server in background
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            state,
            client: reqwest::Client::new(),
            handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Shared HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Direct access to the server's state, for checking the directory
    /// without going through HTTP
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Log in over HTTP and return the full token response
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        exp_override_sec: Option<u64>,
    ) -> Result<TokenResponse, anyhow::Error> {
        let mut body = serde_json::json!({ "email": email, "password": password });
        if let Some(seconds) = exp_override_sec {
            body["expOverrideSec"] = serde_json::json!(seconds);
        }

        let response = self
            .client
            .post(format!("{}/auth/login", self.url()))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Login for {} failed with {}", email, response.status());
        }

        Ok(response.json::<TokenResponse>().await?)
    }

    /// Log in over HTTP and return only the token
    pub async fn login_token(&self, email: &str, password: &str) -> Result<String, anyhow::Error> {
        Ok(self.login(email, password, None).await?.token)
    }
}

impl Drop for TestApiServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
