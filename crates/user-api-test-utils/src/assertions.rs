//! Custom test assertions for expressive tests
//!
//! Structural checks on issued tokens. Signature verification is the
//! service's job and is tested there.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

/// JWT header structure
#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

/// JWT claims structure
#[derive(Debug, Deserialize)]
struct JwtClaims {
    pub email: String,
    pub role: String,
    #[expect(dead_code)] // Used for JWT structure validation but not accessed
    pub name: String,
    pub iat: f64,
    pub exp: f64,
}

fn decode_part<T: for<'de> Deserialize<'de>>(token: &str, index: usize, what: &str) -> T {
    let part = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT has no {} segment", what));
    let bytes = URL_SAFE_NO_PAD
        .decode(part)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT {}: {:?}", what, e));
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("Failed to parse JWT {} JSON: {:?}", what, e))
}

fn claims_of(token: &str) -> JwtClaims {
    decode_part(token, 1, "payload")
}

/// Custom assertions for issued tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_for_email("user@example.com")
///     .assert_role("user")
///     .assert_expires_in(900);
/// ```
pub trait TokenAssertions {
    /// Assert that the token is a well-formed HS256 JWT with the expected claims
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert the role claim
    fn assert_role(&self, role: &str) -> &Self;

    /// Assert the email claim
    fn assert_for_email(&self, email: &str) -> &Self;

    /// Assert that the token expires within the specified seconds
    fn assert_expires_in(&self, seconds: u64) -> &Self;

    /// Assert that `exp - iat` is exactly the given lifetime
    fn assert_lifetime(&self, seconds: u64) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        let parts = self.split('.').count();
        assert_eq!(
            parts, 3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts
        );

        let header: JwtHeader = decode_part(self, 0, "header");
        assert_eq!(header.alg, "HS256", "Expected HS256 algorithm");
        assert_eq!(header.typ, "JWT", "Expected JWT type");

        let claims = claims_of(self);
        assert!(
            claims.exp > claims.iat,
            "exp ({}) must be after iat ({})",
            claims.exp,
            claims.iat
        );

        self
    }

    fn assert_role(&self, role: &str) -> &Self {
        let claims = claims_of(self);
        assert_eq!(
            claims.role, role,
            "Expected role '{}', got '{}'",
            role, claims.role
        );
        self
    }

    fn assert_for_email(&self, email: &str) -> &Self {
        let claims = claims_of(self);
        assert_eq!(
            claims.email, email,
            "Expected email '{}', got '{}'",
            email, claims.email
        );
        self
    }

    fn assert_expires_in(&self, seconds: u64) -> &Self {
        let claims = claims_of(self);
        let now = chrono::Utc::now().timestamp_millis() as f64 / 1000.0;
        let expires_in = claims.exp - now;

        // Allow 5-second tolerance for slow test machines
        assert!(
            (expires_in - seconds as f64).abs() <= 5.0,
            "Expected token to expire in {} seconds, but expires in {} seconds",
            seconds,
            expires_in
        );

        self
    }

    fn assert_lifetime(&self, seconds: u64) -> &Self {
        let claims = claims_of(self);
        let lifetime = claims.exp - claims.iat;

        assert!(
            (lifetime - seconds as f64).abs() < 1e-6,
            "Expected exp - iat to be {} seconds, got {}",
            seconds,
            lifetime
        );

        self
    }
}
