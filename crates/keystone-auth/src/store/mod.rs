//! Identity store interface and its implementations.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use keystone_core::result::AppResult;
use keystone_entity::permission::AuthorizationSnapshot;
use keystone_entity::role::Role;
use keystone_entity::token::RefreshTokenRecord;
use keystone_entity::user::User;

pub use memory::MemoryIdentityStore;
pub use postgres::PgIdentityStore;

/// Read access to the user/role/permission graph plus the refresh token
/// write path.
///
/// This is the complete surface the access-control engine needs from
/// persistence; user, role, and permission rows are never written through
/// it. Implementations must treat every call as fallible I/O — callers fail
/// closed on error.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Look up a user by email (case-insensitive).
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Load a user together with its role, the role's permission grants,
    /// and the user's direct grants, in one read.
    async fn load_authorization_snapshot(
        &self,
        user_id: i64,
    ) -> AppResult<Option<AuthorizationSnapshot>>;

    /// Look up a role by id.
    async fn find_role_by_id(&self, role_id: i64) -> AppResult<Option<Role>>;

    /// Look up a stored refresh token by its token value.
    async fn find_refresh_token(&self, token: &str) -> AppResult<Option<RefreshTokenRecord>>;

    /// Create or replace the single stored refresh token for a user.
    async fn upsert_refresh_token(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Delete refresh tokens whose expiry lies before `now`; returns the
    /// number of rows removed.
    async fn delete_expired_refresh_tokens(&self, now: DateTime<Utc>) -> AppResult<u64>;
}
