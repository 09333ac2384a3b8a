//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports the [`secrecy`] types used across the User API. Wrap every
//! sensitive value in one of these: the JWT signing secret, login passwords,
//! and the plaintext credentials held by the credential store.
//!
//! `SecretString` implements `Debug` with redaction, so a struct deriving
//! `Debug` that contains one can be logged with `{:?}` or passed to tracing
//! without leaking the value. Reading the value requires an explicit
//! `expose_secret()` call, which keeps every use site greppable.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct LoginAttempt {
//!     email: String,
//!     password: SecretString,
//! }
//!
//! let attempt = LoginAttempt {
//!     email: "user@example.com".to_string(),
//!     password: SecretString::from("secret"),
//! };
//!
//! assert!(!format!("{attempt:?}").contains("\"secret\""));
//! assert_eq!(attempt.password.expose_secret(), "secret");
//! ```
//!
//! With the `serde` feature of `secrecy` enabled, `SecretString` fields can be
//! deserialized straight out of request bodies.

pub use secrecy::{ExposeSecret, SecretString};
