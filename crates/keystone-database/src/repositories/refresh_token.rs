//! Refresh token repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use keystone_core::error::{AppError, ErrorKind};
use keystone_core::result::AppResult;
use keystone_entity::token::RefreshTokenRecord;

/// Repository for stored refresh tokens.
///
/// The table carries a UNIQUE constraint on `user_id`; all writes go through
/// [`upsert`](Self::upsert) so rotation can never leave two rows for a user.
#[derive(Debug, Clone)]
pub struct RefreshTokenRepository {
    pool: PgPool,
}

impl RefreshTokenRepository {
    /// Create a new refresh token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a stored record by token value.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<RefreshTokenRecord>> {
        sqlx::query_as::<_, RefreshTokenRecord>("SELECT * FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find refresh token", e)
            })
    }

    /// Find the (at most one) stored record for a user.
    pub async fn find_by_user(&self, user_id: i64) -> AppResult<Option<RefreshTokenRecord>> {
        sqlx::query_as::<_, RefreshTokenRecord>("SELECT * FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find refresh token", e)
            })
    }

    /// Create or replace the stored refresh token for a user.
    pub async fn upsert(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO refresh_tokens (user_id, token, expires_at) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id) DO UPDATE SET token = EXCLUDED.token, \
             expires_at = EXCLUDED.expires_at",
        )
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to upsert refresh token", e)
        })?;
        Ok(())
    }

    /// Delete all records whose expiry lies before `now`.
    ///
    /// Returns the number of rows removed. Expired tokens are already
    /// rejected on use; this only keeps the table small.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete expired tokens", e)
            })?;
        Ok(result.rows_affected())
    }
}
