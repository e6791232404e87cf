//! In-memory identity store for single-node development and tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use keystone_core::result::AppResult;
use keystone_entity::permission::{AuthorizationSnapshot, PermissionGrant};
use keystone_entity::role::{Role, RoleSnapshot};
use keystone_entity::token::RefreshTokenRecord;
use keystone_entity::user::User;

use super::IdentityStore;

/// Internal state for the memory-based identity store.
#[derive(Debug, Default)]
struct InnerState {
    users: HashMap<i64, User>,
    roles: HashMap<i64, Role>,
    role_grants: HashMap<i64, Vec<PermissionGrant>>,
    direct_grants: HashMap<i64, Vec<PermissionGrant>>,
    refresh_tokens: HashMap<i64, RefreshTokenRecord>,
    next_user_id: i64,
    next_role_id: i64,
    next_token_id: i64,
}

/// In-memory [`IdentityStore`] using a Tokio mutex for thread safety.
///
/// Tracks the number of reads performed so tests can assert that rejected
/// requests never touched the store.
#[derive(Debug, Clone, Default)]
pub struct MemoryIdentityStore {
    state: Arc<Mutex<InnerState>>,
    reads: Arc<AtomicU64>,
}

impl MemoryIdentityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store reads performed so far.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    /// Insert a role with the given grants; returns its id.
    pub async fn add_role(&self, name: &str, grants: Vec<PermissionGrant>) -> i64 {
        let mut state = self.state.lock().await;
        state.next_role_id += 1;
        let id = state.next_role_id;
        state.roles.insert(
            id,
            Role {
                id,
                name: name.to_lowercase(),
                description: None,
                is_system_role: name.eq_ignore_ascii_case("admin"),
            },
        );
        state.role_grants.insert(id, grants);
        id
    }

    /// Insert a user; returns its id.
    pub async fn add_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role_id: Option<i64>,
    ) -> i64 {
        let mut state = self.state.lock().await;
        state.next_user_id += 1;
        let id = state.next_user_id;
        let now = Utc::now();
        state.users.insert(
            id,
            User {
                id,
                name: name.to_string(),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                role_id,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    /// Attach a direct permission grant to a user.
    pub async fn grant_direct(&self, user_id: i64, grant: PermissionGrant) {
        let mut state = self.state.lock().await;
        state.direct_grants.entry(user_id).or_default().push(grant);
    }

    /// The stored refresh token for a user, if any.
    pub async fn refresh_token_for(&self, user_id: i64) -> Option<RefreshTokenRecord> {
        let state = self.state.lock().await;
        state.refresh_tokens.get(&user_id).cloned()
    }

    /// Total number of stored refresh token records.
    pub async fn refresh_token_rows(&self) -> usize {
        let state = self.state.lock().await;
        state.refresh_tokens.len()
    }

    /// Backdate the stored refresh token for a user, for expiry tests.
    pub async fn expire_refresh_token(&self, user_id: i64) {
        let mut state = self.state.lock().await;
        if let Some(record) = state.refresh_tokens.get_mut(&user_id) {
            record.expires_at = Utc::now() - chrono::Duration::hours(1);
        }
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn load_authorization_snapshot(
        &self,
        user_id: i64,
    ) -> AppResult<Option<AuthorizationSnapshot>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().await;
        let Some(user) = state.users.get(&user_id) else {
            return Ok(None);
        };

        let role = user
            .role_id
            .and_then(|rid| state.roles.get(&rid))
            .map(|r| RoleSnapshot {
                id: r.id,
                name: r.name.clone(),
            });

        let role_grants = user
            .role_id
            .and_then(|rid| state.role_grants.get(&rid))
            .cloned()
            .unwrap_or_default();

        let direct_grants = state.direct_grants.get(&user_id).cloned().unwrap_or_default();

        Ok(Some(AuthorizationSnapshot {
            user_id: user.id,
            email: user.email.clone(),
            role,
            role_grants,
            direct_grants,
        }))
    }

    async fn find_role_by_id(&self, role_id: i64) -> AppResult<Option<Role>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().await;
        Ok(state.roles.get(&role_id).cloned())
    }

    async fn find_refresh_token(&self, token: &str) -> AppResult<Option<RefreshTokenRecord>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().await;
        Ok(state
            .refresh_tokens
            .values()
            .find(|r| r.token == token)
            .cloned())
    }

    async fn upsert_refresh_token(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.next_token_id += 1;
        let id = state.next_token_id;
        state.refresh_tokens.insert(
            user_id,
            RefreshTokenRecord {
                id,
                user_id,
                token: token.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete_expired_refresh_tokens(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.refresh_tokens.len();
        state.refresh_tokens.retain(|_, r| r.expires_at >= now);
        Ok((before - state.refresh_tokens.len()) as u64)
    }
}
