//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;

use keystone_auth::access::AccessPipeline;
use keystone_auth::password::{PasswordHasher, PasswordPolicy};
use keystone_auth::recovery::PasswordRecovery;
use keystone_auth::token::TokenManager;
use keystone_core::config::AppConfig;
use keystone_database::repositories::{PermissionRepository, RoleRepository, UserRepository};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,

    /// Token lifecycle manager (login, refresh, pair issuance).
    pub token_manager: Arc<TokenManager>,
    /// Access decision pipeline (authentication + authorization).
    pub pipeline: Arc<AccessPipeline>,
    /// Password-reset token issuance.
    pub recovery: Arc<PasswordRecovery>,
    /// Argon2id password hasher.
    pub password_hasher: PasswordHasher,
    /// Password strength policy applied at signup.
    pub password_policy: PasswordPolicy,

    /// User repository.
    pub user_repo: Arc<UserRepository>,
    /// Role repository.
    pub role_repo: Arc<RoleRepository>,
    /// Permission catalog repository.
    pub permission_repo: Arc<PermissionRepository>,
}
