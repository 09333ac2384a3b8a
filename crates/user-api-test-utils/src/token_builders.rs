//! Builder for hand-made test tokens
//!
//! Produces signed tokens without going through the login flow, so tests can
//! present tokens the service would never issue: already expired, signed with
//! another secret or algorithm, or carrying a forged role.

use crate::fixtures::{TEST_JWT_SECRET, USER_EMAIL, USER_NAME};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;

/// Builder for signed test tokens
///
/// Defaults to the seeded regular user, a one hour lifetime, HS256 and the
/// test server's secret.
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .as_admin()
///     .expires_in(-60)
///     .build();
/// ```
pub struct TestTokenBuilder {
    email: String,
    role: String,
    name: String,
    iat: i64,
    exp: i64,
    secret: String,
    algorithm: Algorithm,
}

impl TestTokenBuilder {
    /// Create a new token builder with defaults
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            email: USER_EMAIL.to_string(),
            role: "user".to_string(),
            name: USER_NAME.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(3600)).timestamp(),
            secret: TEST_JWT_SECRET.to_string(),
            algorithm: Algorithm::HS256,
        }
    }

    /// Set the email claim
    pub fn for_email(mut self, email: &str) -> Self {
        self.email = email.to_string();
        self
    }

    /// Set the role claim (not limited to valid roles)
    pub fn with_role(mut self, role: &str) -> Self {
        self.role = role.to_string();
        self
    }

    /// Shorthand for `with_role("admin")`
    pub fn as_admin(self) -> Self {
        self.with_role("admin")
    }

    /// Set the name claim
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Set expiration in seconds from now; negative values give an expired token
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self
    }

    /// Set issued-at timestamp
    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.iat = timestamp;
        self
    }

    /// Sign with a secret other than the test server's
    pub fn signed_with(mut self, secret: &str) -> Self {
        self.secret = secret.to_string();
        self
    }

    /// Sign with another HMAC algorithm
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Build the claims as a JSON value
    pub fn claims(&self) -> serde_json::Value {
        json!({
            "email": self.email,
            "role": self.role,
            "name": self.name,
            "iat": self.iat,
            "exp": self.exp,
        })
    }

    /// Sign and return the compact token
    pub fn build(self) -> String {
        let claims = self.claims();
        encode(
            &Header::new(self.algorithm),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .expect("Failed to sign test token")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
