//! Auth handlers — signup, login, refresh, forgot-password.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use keystone_core::error::AppError;
use keystone_entity::token::TokenPair;
use keystone_entity::user::CreateUser;

use crate::dto::request::{ForgotPasswordRequest, LoginRequest, RefreshRequest, SignupRequest};
use crate::dto::response::{ApiResponse, MessageResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::handlers::validate_body;
use crate::state::AppState;

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    validate_body(&req)?;
    state.password_policy.validate(&req.password)?;

    if state.user_repo.find_by_email(&req.email).await?.is_some() {
        return Err(ApiError(AppError::conflict("Email is already registered")));
    }

    let password_hash = state.password_hasher.hash_password(&req.password)?;
    let user = state
        .user_repo
        .create(&CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user.into()))))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, ApiError> {
    validate_body(&req)?;
    let pair = state.token_manager.login(&req.email, &req.password).await?;
    Ok(Json(ApiResponse::ok(pair)))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, ApiError> {
    let pair = state.token_manager.refresh(&req.refresh_token).await?;
    Ok(Json(ApiResponse::ok(pair)))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state
        .user_repo
        .find_by_id(user.user_id)
        .await?
        .ok_or_else(|| AppError::user_not_found("User not found"))?;
    Ok(Json(ApiResponse::ok(user.into())))
}

/// POST /api/auth/forgot-password
///
/// Responds identically for known and unknown addresses.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_body(&req)?;
    state.recovery.request_reset(&req.email).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "If the address is registered, a reset email has been sent",
    ))))
}
