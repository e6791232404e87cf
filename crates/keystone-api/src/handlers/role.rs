//! Role management handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use keystone_core::error::AppError;

use crate::dto::request::{CreateRoleRequest, UpdateRoleRequest};
use crate::dto::response::{ApiResponse, MessageResponse, RoleResponse};
use crate::error::ApiError;
use crate::handlers::validate_body;
use crate::state::AppState;

/// GET /api/roles
pub async fn list_roles(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RoleResponse>>>, ApiError> {
    let roles = state.role_repo.find_all().await?;

    let mut out = Vec::with_capacity(roles.len());
    for role in roles {
        let permissions = state.role_repo.find_permissions(role.id).await?;
        out.push(RoleResponse::from_parts(role, permissions));
    }
    Ok(Json(ApiResponse::ok(out)))
}

/// GET /api/roles/{id}
pub async fn get_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<RoleResponse>>, ApiError> {
    let role = state
        .role_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No role with id {id}")))?;
    let permissions = state.role_repo.find_permissions(role.id).await?;
    Ok(Json(ApiResponse::ok(RoleResponse::from_parts(
        role,
        permissions,
    ))))
}

/// POST /api/roles
pub async fn create_role(
    State(state): State<AppState>,
    Json(req): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RoleResponse>>), ApiError> {
    validate_body(&req)?;

    if state.role_repo.find_by_name(&req.name).await?.is_some() {
        return Err(ApiError(AppError::conflict("Role name is already taken")));
    }
    ensure_permission_ids_exist(&state, &req.permission_ids).await?;

    let role = state
        .role_repo
        .create(&req.name, req.description.as_deref(), &req.permission_ids)
        .await?;
    let permissions = state.role_repo.find_permissions(role.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(RoleResponse::from_parts(role, permissions))),
    ))
}

/// PATCH /api/roles/{id}
pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<ApiResponse<RoleResponse>>, ApiError> {
    let role = state
        .role_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No role with id {id}")))?;

    if role.is_system_role {
        return Err(ApiError(AppError::forbidden(
            "System roles cannot be modified",
        )));
    }

    if let Some(name) = &req.name {
        if let Some(existing) = state.role_repo.find_by_name(name).await? {
            if existing.id != id {
                return Err(ApiError(AppError::conflict("Role name is already taken")));
            }
        }
    }
    if let Some(ids) = &req.permission_ids {
        ensure_permission_ids_exist(&state, ids).await?;
    }

    state
        .role_repo
        .update(
            id,
            req.name.as_deref(),
            req.description.as_deref(),
            req.permission_ids.as_deref(),
        )
        .await?;

    let role = state
        .role_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No role with id {id}")))?;
    let permissions = state.role_repo.find_permissions(id).await?;
    Ok(Json(ApiResponse::ok(RoleResponse::from_parts(
        role,
        permissions,
    ))))
}

/// DELETE /api/roles/{id}
pub async fn delete_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let role = state
        .role_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No role with id {id}")))?;

    if role.is_system_role {
        return Err(ApiError(AppError::forbidden(
            "System roles cannot be deleted",
        )));
    }
    if state.role_repo.count_users(id).await? > 0 {
        return Err(ApiError(AppError::conflict(
            "Role is assigned to users and cannot be deleted",
        )));
    }

    state.role_repo.delete(id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Role deleted"))))
}

async fn ensure_permission_ids_exist(state: &AppState, ids: &[i64]) -> Result<(), ApiError> {
    let found = state.permission_repo.find_by_ids(ids).await?;
    if found.len() != ids.len() {
        return Err(ApiError(AppError::validation(
            "One or more permission ids do not exist",
        )));
    }
    Ok(())
}
