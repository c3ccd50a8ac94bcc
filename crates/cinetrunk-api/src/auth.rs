//! Password hashing and session token issuance.
//!
//! Argon2 work is CPU-bound; handlers call it through `spawn_blocking`.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Token signing material for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  /// HS256 shared secret.
  pub jwt_secret: String,
  pub token_ttl:  Duration,
}

/// JWT claims carried by a login token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
  pub sub:      Uuid,
  pub username: String,
  pub iat:      i64,
  pub exp:      i64,
}

/// Hash `password` into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Store(format!("argon2 error: {e}").into()))
}

/// Check `password` against a stored PHC string. A malformed hash never
/// verifies.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else { return false };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

/// Sign a token for `user_id` valid for the configured TTL from `now`.
pub fn issue_token(
  config:   &AuthConfig,
  user_id:  Uuid,
  username: &str,
  now:      DateTime<Utc>,
) -> Result<String, ApiError> {
  let claims = Claims {
    sub:      user_id,
    username: username.to_owned(),
    iat:      now.timestamp(),
    exp:      (now + config.token_ttl).timestamp(),
  };
  jsonwebtoken::encode(
    &Header::default(),
    &claims,
    &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
  )
  .map_err(|e| ApiError::Store(Box::new(e)))
}

/// Verify a token's signature and expiry and return its claims. Routes do
/// not check tokens, so only tests read them back.
#[cfg(test)]
pub(crate) fn decode_token(config: &AuthConfig, token: &str) -> Result<Claims, ApiError> {
  use jsonwebtoken::{DecodingKey, Validation};

  jsonwebtoken::decode::<Claims>(
    token,
    &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
    &Validation::default(),
  )
  .map(|data| data.claims)
  .map_err(|e| ApiError::Unauthorized(e.to_string()))
}
