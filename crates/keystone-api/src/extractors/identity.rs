//! `CurrentUser` extractor — reads the identity attached by the access
//! middleware.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use keystone_core::error::AppError;
use keystone_entity::identity::Identity;

use crate::error::ApiError;

/// The authenticated caller, available in handlers behind the access layer.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl std::ops::Deref for CurrentUser {
    type Target = Identity;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| {
                ApiError(AppError::not_authenticated("User not authenticated"))
            })
    }
}
