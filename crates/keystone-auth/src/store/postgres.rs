//! PostgreSQL-backed identity store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use keystone_core::result::AppResult;
use keystone_database::repositories::{RefreshTokenRepository, RoleRepository, UserRepository};
use keystone_entity::permission::AuthorizationSnapshot;
use keystone_entity::role::Role;
use keystone_entity::token::RefreshTokenRecord;
use keystone_entity::user::User;

use super::IdentityStore;

/// [`IdentityStore`] backed by the PostgreSQL repositories.
#[derive(Debug, Clone)]
pub struct PgIdentityStore {
    user_repo: Arc<UserRepository>,
    role_repo: Arc<RoleRepository>,
    refresh_repo: Arc<RefreshTokenRepository>,
}

impl PgIdentityStore {
    /// Create a store over the given repositories.
    pub fn new(
        user_repo: Arc<UserRepository>,
        role_repo: Arc<RoleRepository>,
        refresh_repo: Arc<RefreshTokenRepository>,
    ) -> Self {
        Self {
            user_repo,
            role_repo,
            refresh_repo,
        }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.user_repo.find_by_email(email).await
    }

    async fn load_authorization_snapshot(
        &self,
        user_id: i64,
    ) -> AppResult<Option<AuthorizationSnapshot>> {
        self.user_repo.load_authorization_snapshot(user_id).await
    }

    async fn find_role_by_id(&self, role_id: i64) -> AppResult<Option<Role>> {
        self.role_repo.find_by_id(role_id).await
    }

    async fn find_refresh_token(&self, token: &str) -> AppResult<Option<RefreshTokenRecord>> {
        self.refresh_repo.find_by_token(token).await
    }

    async fn upsert_refresh_token(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.refresh_repo.upsert(user_id, token, expires_at).await
    }

    async fn delete_expired_refresh_tokens(&self, now: DateTime<Utc>) -> AppResult<u64> {
        self.refresh_repo.delete_expired(now).await
    }
}
