//! User management handlers.

use axum::Json;
use axum::extract::{Path, State};

use keystone_core::error::AppError;

use crate::dto::request::{AssignPermissionsRequest, AssignRoleRequest};
use crate::dto::response::{ApiResponse, MessageResponse, UserResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, ApiError> {
    let users = state.user_repo.find_all().await?;
    Ok(Json(ApiResponse::ok(
        users.into_iter().map(UserResponse::from).collect(),
    )))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state
        .user_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::user_not_found(format!("No user with id {id}")))?;
    Ok(Json(ApiResponse::ok(user.into())))
}

/// PATCH /api/users/assign-role
pub async fn assign_role(
    State(state): State<AppState>,
    Json(req): Json<AssignRoleRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .role_repo
        .find_by_id(req.role_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No role with id {}", req.role_id)))?;

    state.user_repo.assign_role(req.user_id, req.role_id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Role assigned"))))
}

/// PATCH /api/users/assign-permissions
///
/// Replaces the user's direct grants with the given set.
pub async fn assign_permissions(
    State(state): State<AppState>,
    Json(req): Json<AssignPermissionsRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .user_repo
        .find_by_id(req.user_id)
        .await?
        .ok_or_else(|| AppError::user_not_found(format!("No user with id {}", req.user_id)))?;

    let found = state.permission_repo.find_by_ids(&req.permission_ids).await?;
    if found.len() != req.permission_ids.len() {
        return Err(ApiError(AppError::validation(
            "One or more permission ids do not exist",
        )));
    }

    state
        .user_repo
        .set_direct_permissions(req.user_id, &req.permission_ids)
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Permissions assigned",
    ))))
}
