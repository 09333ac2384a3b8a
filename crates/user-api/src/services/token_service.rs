use crate::crypto::{self, Claims};
use crate::errors::ApiError;
use crate::models::{Identity, TokenResponse};
use common::jwt::{self, TOKEN_TYPE_BEARER};
use common::secret::SecretString;

/// Issue a signed token asserting `identity` for `ttl_seconds`.
///
/// `iat` is the current time at millisecond precision and `exp` is exactly
/// `iat + ttl_seconds`.
pub fn issue_token(
    identity: &Identity,
    secret: &SecretString,
    ttl_seconds: u64,
) -> Result<TokenResponse, ApiError> {
    let iat = jwt::now_numeric_date();

    let claims = Claims {
        email: identity.email.clone(),
        role: identity.role,
        name: identity.name.clone(),
        iat,
        exp: iat + ttl_seconds as f64,
    };

    let token = crypto::sign_jwt(&claims, secret)?;

    Ok(TokenResponse {
        token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: ttl_seconds,
    })
}

/// Verify a presented token and return the claims it carries.
///
/// No store lookup: the claims are exactly what was signed.
pub fn verify_token(token: &str, secret: &SecretString) -> Result<Claims, ApiError> {
    crypto::verify_jwt(token, secret)
}
