use crate::errors::ApiError;
use crate::models::Role;
use crate::observability::metrics::record_token_validation;
use common::jwt::{self, JwtValidationError};
use common::secret::{ExposeSecret, SecretString};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::instrument;

/// Only algorithm issued or accepted by this service.
pub const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT Claims structure.
///
/// Self-contained: verification returns exactly what was signed, with no
/// lookup against the credential store or the user directory.
/// `iat` and `exp` are NumericDates with millisecond precision, so a token
/// issued for `n` seconds carries `exp == iat + n`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub role: Role,
    pub name: String,
    pub iat: f64, // Issued at timestamp
    pub exp: f64, // Expiration timestamp
}

/// Custom Debug implementation that redacts identifying fields.
impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("email", &"[REDACTED]")
            .field("role", &self.role)
            .field("name", &"[REDACTED]")
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

/// Sign JWT with the shared HMAC secret
#[instrument(skip_all)]
pub fn sign_jwt(claims: &Claims, secret: &SecretString) -> Result<String, ApiError> {
    let encoding_key = EncodingKey::from_secret(secret.expose_secret().as_bytes());

    let mut header = Header::new(JWT_ALGORITHM);
    header.typ = Some("JWT".to_string());

    encode(&header, claims, &encoding_key).map_err(|e| {
        tracing::error!(target: "crypto", error = %e, "JWT signing operation failed");
        ApiError::Internal
    })
}

/// Verify JWT with the shared HMAC secret
///
/// Validates:
/// - Token size (must be <= MAX_JWT_SIZE_BYTES), before any parsing
/// - Algorithm (HS256 only)
/// - Signature
/// - Expiration, strictly: a token is rejected once the current time reaches `exp`
#[instrument(skip_all)]
pub fn verify_jwt(token: &str, secret: &SecretString) -> Result<Claims, ApiError> {
    match verify_claims(token, secret) {
        Ok(claims) => {
            record_token_validation("success", None);
            Ok(claims)
        }
        Err(e) => {
            let category = match e {
                JwtValidationError::TokenTooLarge => "too_large",
                JwtValidationError::MalformedToken => "invalid",
                JwtValidationError::Expired => "expired",
            };
            record_token_validation("error", Some(category));
            Err(ApiError::from(e))
        }
    }
}

fn verify_claims(token: &str, secret: &SecretString) -> Result<Claims, JwtValidationError> {
    jwt::check_token_size(token)?;

    let decoding_key = DecodingKey::from_secret(secret.expose_secret().as_bytes());

    // jsonwebtoken only understands whole-second `exp`; the claim is
    // required by `Claims` itself and checked below at millisecond precision
    let mut validation = Validation::new(JWT_ALGORITHM);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(target: "crypto", error = %e, "Token verification failed");
        JwtValidationError::MalformedToken
    })?;

    jwt::validate_exp(token_data.claims.exp)?;

    Ok(token_data.claims)
}
