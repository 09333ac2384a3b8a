use common::secret::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 3000;

/// Signing secret used when `JWT_SECRET` is not set. Development only.
pub const DEFAULT_JWT_SECRET: &str = "dev-secret";

/// Token lifetime used when `JWT_EXPIRES_IN` is not set.
pub const DEFAULT_JWT_EXPIRES_IN: &str = "15m";

#[derive(Clone)]
pub struct Config {
    pub bind_address: String,
    pub jwt_secret: SecretString,
    /// Default lifetime of issued tokens, in seconds.
    pub token_ttl_seconds: u64,
    /// Emit JSON-formatted logs instead of the human-readable format.
    pub json_logs: bool,
}

/// Custom Debug implementation that redacts the signing secret.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("json_logs", &self.json_logs)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid PORT value: {0}")]
    InvalidPort(String),

    #[error("Invalid JWT_EXPIRES_IN value: {0}")]
    InvalidTokenLifetime(String),

    #[error("JWT_SECRET must not be empty")]
    EmptySecret,

    #[error("Failed to read .env file: {0}")]
    EnvFile(String),
}

/// Load a `.env` file from the working directory or one of its parents.
///
/// Entries become process environment variables unless already set, so the
/// real environment always wins. Returns the loaded path, or `None` when no
/// file exists.
pub fn load_env_file() -> Result<Option<PathBuf>, ConfigError> {
    match dotenv::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(ConfigError::EnvFile(e.to_string())),
    }
}

/// Load a specific `.env` file with the same precedence as [`load_env_file`].
pub fn load_env_file_from(path: &Path) -> Result<(), ConfigError> {
    dotenv::from_path(path).map_err(|e| ConfigError::EnvFile(e.to_string()))
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = match vars.get("BIND_ADDRESS") {
            Some(address) => address.clone(),
            None => {
                let port = match vars.get("PORT") {
                    Some(raw) => raw
                        .trim()
                        .parse::<u16>()
                        .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
                    None => DEFAULT_PORT,
                };
                format!("0.0.0.0:{}", port)
            }
        };

        let jwt_secret = vars
            .get("JWT_SECRET")
            .cloned()
            .unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string());

        if jwt_secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }

        let expires_in = vars
            .get("JWT_EXPIRES_IN")
            .map(String::as_str)
            .unwrap_or(DEFAULT_JWT_EXPIRES_IN);
        let token_ttl_seconds = parse_lifetime(expires_in)?;

        let json_logs = vars
            .get("LOG_FORMAT")
            .is_some_and(|format| format.eq_ignore_ascii_case("json"));

        Ok(Config {
            bind_address,
            jwt_secret: SecretString::from(jwt_secret),
            token_ttl_seconds,
            json_logs,
        })
    }

    /// Whether the development fallback secret is in use.
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret.expose_secret() == DEFAULT_JWT_SECRET
    }
}

/// Parse a token lifetime: plain seconds (`900`) or a number with a unit
/// suffix (`30s`, `15m`, `1h`, `7d`). Zero is rejected.
pub fn parse_lifetime(raw: &str) -> Result<u64, ConfigError> {
    let value = raw.trim();
    let invalid = || ConfigError::InvalidTokenLifetime(raw.to_string());

    let (digits, multiplier) = match value.char_indices().last() {
        Some((idx, 's')) => (value.get(..idx).ok_or_else(invalid)?, 1),
        Some((idx, 'm')) => (value.get(..idx).ok_or_else(invalid)?, 60),
        Some((idx, 'h')) => (value.get(..idx).ok_or_else(invalid)?, 3600),
        Some((idx, 'd')) => (value.get(..idx).ok_or_else(invalid)?, 86_400),
        Some(_) => (value, 1),
        None => return Err(invalid()),
    };

    let amount = digits.parse::<u64>().map_err(|_| invalid())?;
    let seconds = amount.checked_mul(multiplier).ok_or_else(invalid)?;

    if seconds == 0 {
        return Err(invalid());
    }

    Ok(seconds)
}
