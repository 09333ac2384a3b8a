//! Common utilities and types shared across the User API crates.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for JWT utilities (size limits, bearer parsing, expiry checks)
pub mod jwt;
