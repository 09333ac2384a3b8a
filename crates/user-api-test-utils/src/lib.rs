//! # User API Test Utilities
//!
//! Shared test utilities for the User API service.
//!
//! This crate provides:
//! - Fixed fixtures (seeded accounts, test signing secret)
//! - Token builders (hand-built claims, expired or foreign-signed tokens)
//! - Server test harness (TestApiServer for E2E tests)
//! - Custom assertions (TokenAssertions trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use user_api_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestApiServer::spawn().await?;
//!
//!     let token = server.login_token(USER_EMAIL, SEED_PASSWORD).await?;
//!     token.assert_valid_jwt().assert_role("user");
//!
//!     let expired = TestTokenBuilder::new().expires_in(-60).build();
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod fixtures;
pub mod server_harness;
pub mod token_builders;

// Re-export commonly used items
pub use assertions::*;
pub use fixtures::*;
pub use server_harness::*;
pub use token_builders::*;
