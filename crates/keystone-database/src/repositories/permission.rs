//! Permission catalog repository implementation.

use sqlx::PgPool;

use keystone_core::error::{AppError, ErrorKind};
use keystone_core::result::AppResult;
use keystone_entity::permission::Permission;

/// Repository for the permission catalog.
#[derive(Debug, Clone)]
pub struct PermissionRepository {
    pool: PgPool,
}

impl PermissionRepository {
    /// Create a new permission repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List the whole catalog ordered by module then action.
    pub async fn find_all(&self) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, Permission>("SELECT * FROM permissions ORDER BY module, action")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list permissions", e)
            })
    }

    /// Fetch the subset of the catalog matching the given ids.
    ///
    /// Callers use the returned length to detect unknown ids.
    pub async fn find_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, Permission>("SELECT * FROM permissions WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to load permissions by id", e)
            })
    }
}
