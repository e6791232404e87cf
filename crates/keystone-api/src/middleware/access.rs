//! Access enforcement middleware.
//!
//! Every route group carries an [`AccessState`] binding the shared pipeline
//! to that group's [`RoutePolicy`]; the policy is resolved once at router
//! construction, never per request.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use keystone_auth::access::{AccessDecision, AccessPipeline, RoutePolicy};

use crate::error::ApiError;

/// Pipeline plus the policy for one route group.
#[derive(Debug, Clone)]
pub struct AccessState {
    /// Shared access decision pipeline.
    pub pipeline: Arc<AccessPipeline>,
    /// Policy for the routes behind this layer.
    pub policy: RoutePolicy,
}

/// Runs the access pipeline before the handler.
///
/// On success the caller's [`Identity`](keystone_entity::identity::Identity)
/// is inserted into request extensions for the `CurrentUser` extractor; a
/// rejection is terminal and the handler never runs.
pub async fn enforce_access(
    State(access): State<AccessState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok());

    let decision = access.pipeline.check(authorization, &access.policy).await?;
    if let AccessDecision::Allowed(identity) = decision {
        request.extensions_mut().insert(identity);
    }

    Ok(next.run(request).await)
}
