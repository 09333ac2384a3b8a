//! User API Library
//!
//! A small authenticated CRUD service: users log in with email and password,
//! receive short-lived HS256 tokens, and present them as bearer tokens to
//! manage an in-memory user directory. Deletion requires the admin role.
//!
//! # Modules
//!
//! - `config` - Service configuration from environment variables
//! - `crypto` - JWT signing and verification
//! - `errors` - Error type and its HTTP mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - Bearer authentication, role checks, HTTP metrics
//! - `models` - Data models
//! - `observability` - Metrics and log correlation helpers
//! - `repositories` - Credential store and user directory
//! - `routes` - Router and application state
//! - `services` - Token issuance, login and refresh flows

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
