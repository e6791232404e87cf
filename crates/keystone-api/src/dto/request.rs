//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Account email.
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token refresh request body. The field name matches the camelCase
/// `refreshToken` the login response emits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// Refresh token.
    pub refresh_token: String,
}

/// Signup request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    /// Display name.
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    /// Account email.
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    /// Password (checked against the password policy).
    pub password: String,
}

/// Forgot-password request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    /// Account email.
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
}

/// Role assignment request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignRoleRequest {
    /// Target user.
    pub user_id: i64,
    /// Role to assign.
    pub role_id: i64,
}

/// Direct permission assignment request; replaces the user's direct grants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignPermissionsRequest {
    /// Target user.
    pub user_id: i64,
    /// Permission ids to grant directly.
    pub permission_ids: Vec<i64>,
}

/// Create role request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRoleRequest {
    /// Role name (stored lowercase).
    #[validate(length(min = 1, max = 100, message = "Role name is required"))]
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Permission ids granted to the role.
    #[serde(default)]
    pub permission_ids: Vec<i64>,
}

/// Update role request. Absent fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    /// New role name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// Replacement permission grants.
    pub permission_ids: Option<Vec<i64>>,
}
