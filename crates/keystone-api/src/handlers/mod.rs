//! HTTP request handlers.

pub mod auth;
pub mod health;
pub mod permission;
pub mod role;
pub mod user;

use keystone_core::error::AppError;
use validator::Validate;

use crate::error::ApiError;

/// Run validator-derive checks and surface failures as a 400.
pub(crate) fn validate_body<T: Validate>(body: &T) -> Result<(), ApiError> {
    body.validate()
        .map_err(|e| ApiError(AppError::validation(e.to_string())))
}
