//! Fixed values shared by tests.
//!
//! The accounts mirror what the service seeds at startup.

/// Seeded admin account (directory id 1).
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_NAME: &str = "Admin";
pub const ADMIN_ID: u64 = 1;

/// Seeded regular account (directory id 2).
pub const USER_EMAIL: &str = "user@example.com";
pub const USER_NAME: &str = "User One";
pub const USER_ID: u64 = 2;

/// Password of both seeded accounts.
pub const SEED_PASSWORD: &str = "secret";

/// Signing secret the test server is configured with.
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-integration-tests";

/// Default token lifetime of the test server, in seconds.
pub const TEST_TOKEN_TTL_SECONDS: u64 = 900;
