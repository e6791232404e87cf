//! User repository implementation.

use sqlx::PgPool;

use keystone_core::error::{AppError, ErrorKind};
use keystone_core::result::AppResult;
use keystone_entity::permission::{AuthorizationSnapshot, PermissionGrant};
use keystone_entity::role::RoleSnapshot;
use keystone_entity::user::{CreateUser, User};

/// Repository for user rows and the authorization read used by the
/// permission resolver.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
            })
    }

    /// List all users, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))
    }

    /// Insert a new user.
    pub async fn create(&self, user: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create user", e))
    }

    /// Assign a role to a user.
    pub async fn assign_role(&self, user_id: i64, role_id: i64) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE users SET role_id = $1, updated_at = NOW() WHERE id = $2")
                .bind(role_id)
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to assign role", e)
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::user_not_found(format!("No user with id {user_id}")));
        }
        Ok(())
    }

    /// Replace a user's direct permission grants.
    pub async fn set_direct_permissions(
        &self,
        user_id: i64,
        permission_ids: &[i64],
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query("DELETE FROM user_permissions WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to clear direct grants", e)
            })?;

        for permission_id in permission_ids {
            sqlx::query("INSERT INTO user_permissions (user_id, permission_id) VALUES ($1, $2)")
                .bind(user_id)
                .bind(permission_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to insert direct grant", e)
                })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit direct grants", e)
        })
    }

    /// Update a user's password hash.
    pub async fn update_password_hash(&self, user_id: i64, password_hash: &str) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
                .bind(password_hash)
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to update password", e)
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::user_not_found(format!("No user with id {user_id}")));
        }
        Ok(())
    }

    /// Load the user together with its role, the role's grants, and its
    /// direct grants — the single authorization read consumed by the
    /// permission resolver.
    pub async fn load_authorization_snapshot(
        &self,
        user_id: i64,
    ) -> AppResult<Option<AuthorizationSnapshot>> {
        let user_row = sqlx::query_as::<_, UserWithRoleRow>(
            "SELECT u.id, u.email, r.id AS role_id, r.name AS role_name \
             FROM users u LEFT JOIN roles r ON r.id = u.role_id WHERE u.id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load authorization user", e)
        })?;

        let Some(row) = user_row else {
            return Ok(None);
        };

        let role_grants = sqlx::query_as::<_, PermissionGrant>(
            "SELECT p.module, p.action FROM role_permissions rp \
             JOIN permissions p ON p.id = rp.permission_id \
             JOIN users u ON u.role_id = rp.role_id WHERE u.id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load role grants", e))?;

        let direct_grants = sqlx::query_as::<_, PermissionGrant>(
            "SELECT p.module, p.action FROM user_permissions up \
             JOIN permissions p ON p.id = up.permission_id WHERE up.user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load direct grants", e)
        })?;

        let role = match (row.role_id, row.role_name) {
            (Some(id), Some(name)) => Some(RoleSnapshot { id, name }),
            _ => None,
        };

        Ok(Some(AuthorizationSnapshot {
            user_id: row.id,
            email: row.email,
            role,
            role_grants,
            direct_grants,
        }))
    }
}

/// Projection of the users/roles join used by the authorization read.
#[derive(Debug, sqlx::FromRow)]
struct UserWithRoleRow {
    id: i64,
    email: String,
    role_id: Option<i64>,
    role_name: Option<String>,
}
