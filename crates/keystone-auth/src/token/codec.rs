//! Signed token creation and verification.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use keystone_core::config::auth::AuthConfig;
use keystone_core::error::AppError;
use keystone_core::result::AppResult;
use keystone_entity::identity::Identity;

use super::claims::Claims;

/// Signs and verifies compact signed tokens (HMAC-SHA256).
///
/// A pure function of secret + payload + TTL; the same codec issues both
/// access and refresh tokens. The secret is injected at construction so
/// tests can supply isolated secrets.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenCodec {
    /// Create a codec from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self::from_secret(&config.jwt_secret)
    }

    /// Create a codec from a raw secret.
    pub fn from_secret(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // seconds, for clock skew

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign a token for the given identity, expiring `ttl` from now.
    pub fn sign(&self, identity: &Identity, ttl: Duration) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            user_id: identity.user_id,
            email: identity.email.clone(),
            role: identity.role.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::with_source(
                keystone_core::error::ErrorKind::Internal,
                "Failed to encode token",
                e,
            ))
    }

    /// Verify a token and recover its claims.
    ///
    /// Fails with `ExpiredToken` when the embedded expiry has passed and
    /// `InvalidToken` when the signature does not match or the token is
    /// malformed.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::expired_token("Token has expired")
                }
                _ => AppError::invalid_token("Invalid token"),
            }
        })?;

        Ok(data.claims)
    }
}
