//! Permission catalog handlers.

use axum::Json;
use axum::extract::State;

use keystone_entity::permission::Permission;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/permissions
pub async fn list_permissions(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Permission>>>, ApiError> {
    let permissions = state.permission_repo.find_all().await?;
    Ok(Json(ApiResponse::ok(permissions)))
}
