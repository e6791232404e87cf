//! Token lifecycle: login, refresh, and pair issuance with rotation.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, warn};

use keystone_core::config::auth::AuthConfig;
use keystone_core::error::AppError;
use keystone_core::result::AppResult;
use keystone_entity::identity::Identity;
use keystone_entity::role::RoleSnapshot;
use keystone_entity::token::TokenPair;

use crate::password::PasswordHasher;
use crate::store::IdentityStore;

use super::codec::TokenCodec;

/// Refresh tokens always live this long; only the access TTL is
/// configurable.
pub const REFRESH_TTL_DAYS: i64 = 7;

/// Issues, verifies, and rotates paired access/refresh tokens.
#[derive(Clone)]
pub struct TokenManager {
    codec: TokenCodec,
    hasher: PasswordHasher,
    store: Arc<dyn IdentityStore>,
    access_ttl: Duration,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager").finish()
    }
}

impl TokenManager {
    /// Create a manager from configuration and an identity store.
    pub fn new(config: &AuthConfig, store: Arc<dyn IdentityStore>) -> Self {
        Self {
            codec: TokenCodec::new(config),
            hasher: PasswordHasher::new(),
            store,
            access_ttl: Duration::minutes(config.access_ttl_minutes as i64),
        }
    }

    /// The codec this manager signs with.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Authenticate credentials and issue a fresh token pair.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<TokenPair> {
        let user = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::invalid_credentials("Wrong credentials"))?;

        if !self.hasher.verify_password(password, &user.password_hash)? {
            warn!(email = %email, "login rejected: password mismatch");
            return Err(AppError::invalid_credentials("Wrong credentials"));
        }

        let role = match user.role_id {
            Some(role_id) => self
                .store
                .find_role_by_id(role_id)
                .await?
                .map(|r| RoleSnapshot {
                    id: r.id,
                    name: r.name,
                }),
            None => None,
        };

        let identity = Identity {
            user_id: user.id,
            email: user.email,
            role,
        };

        debug!(user_id = identity.user_id, "login accepted");
        self.issue_pair(&identity).await
    }

    /// Exchange a refresh token for a brand-new access/refresh pair.
    ///
    /// The user is re-read so the new tokens carry a fresh role snapshot,
    /// not the one embedded in the old token. The old refresh token is
    /// implicitly invalidated because the new one overwrites the per-user
    /// record.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let record = self
            .store
            .find_refresh_token(refresh_token)
            .await?
            .ok_or_else(|| AppError::invalid_refresh_token("Invalid refresh token"))?;

        if record.is_expired_at(Utc::now()) {
            return Err(AppError::expired_refresh_token("Refresh token expired"));
        }

        let snapshot = self
            .store
            .load_authorization_snapshot(record.user_id)
            .await?
            .ok_or_else(|| AppError::user_not_found("User not found"))?;

        let identity = Identity {
            user_id: snapshot.user_id,
            email: snapshot.email,
            role: snapshot.role,
        };

        debug!(user_id = identity.user_id, "refresh accepted");
        self.issue_pair(&identity).await
    }

    /// Sign an access/refresh pair from the same claims and persist the
    /// refresh token keyed by user id (create-or-replace).
    ///
    /// This is the single point enforcing the one-refresh-token-per-user
    /// invariant: every successful login or refresh mutates exactly one
    /// stored record. Two concurrent refreshes race on the upsert; the last
    /// writer wins and the loser's pair is rejected on next use.
    async fn issue_pair(&self, identity: &Identity) -> AppResult<TokenPair> {
        let refresh_ttl = Duration::days(REFRESH_TTL_DAYS);

        let access_token = self.codec.sign(identity, self.access_ttl)?;
        let refresh_token = self.codec.sign(identity, refresh_ttl)?;

        let expires_at = Utc::now() + refresh_ttl;
        self.store
            .upsert_refresh_token(identity.user_id, &refresh_token, expires_at)
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}
