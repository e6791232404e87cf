//! Route definitions for the Keystone HTTP API.
//!
//! All routes are mounted under `/api`. Every route group carries an access
//! policy resolved here, at router construction; the access middleware runs
//! the pipeline against that policy on each request.

use std::sync::Arc;

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

use keystone_auth::access::{RequiredPermission, RoutePolicy};

use crate::handlers;
use crate::middleware::access::{AccessState, enforce_access};
use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes(&state))
        .merge(user_routes(&state))
        .merge(role_routes(&state))
        .merge(permission_routes(&state))
        .merge(health_routes(&state));

    let cors = build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(request_logging))
        .with_state(state)
}

/// Attach the access layer for one route group, binding the shared pipeline
/// to the group's policy.
fn guarded(router: Router<AppState>, state: &AppState, policy: RoutePolicy) -> Router<AppState> {
    router.route_layer(axum_middleware::from_fn_with_state(
        AccessState {
            pipeline: Arc::clone(&state.pipeline),
            policy,
        },
        enforce_access,
    ))
}

fn require(module: &str, action: &str) -> RoutePolicy {
    RoutePolicy::require([RequiredPermission::new(module, action)])
}

/// Auth endpoints: public except `/auth/me`, which only needs a valid token.
fn auth_routes(state: &AppState) -> Router<AppState> {
    let public = guarded(
        Router::new()
            .route("/auth/signup", post(handlers::auth::signup))
            .route("/auth/login", post(handlers::auth::login))
            .route("/auth/refresh", post(handlers::auth::refresh))
            .route(
                "/auth/forgot-password",
                post(handlers::auth::forgot_password),
            ),
        state,
        RoutePolicy::public(),
    );

    let me = guarded(
        Router::new().route("/auth/me", get(handlers::auth::me)),
        state,
        RoutePolicy::authenticated(),
    );

    public.merge(me)
}

/// User management, gated per operation.
fn user_routes(state: &AppState) -> Router<AppState> {
    let view = guarded(
        Router::new()
            .route("/users", get(handlers::user::list_users))
            .route("/users/{id}", get(handlers::user::get_user)),
        state,
        require("user", "view"),
    );

    let update = guarded(
        Router::new().route("/users/assign-role", patch(handlers::user::assign_role)),
        state,
        require("user", "update"),
    );

    let create = guarded(
        Router::new().route(
            "/users/assign-permissions",
            patch(handlers::user::assign_permissions),
        ),
        state,
        require("user", "create"),
    );

    view.merge(update).merge(create)
}

/// Role management, gated per operation.
fn role_routes(state: &AppState) -> Router<AppState> {
    let view = guarded(
        Router::new()
            .route("/roles", get(handlers::role::list_roles))
            .route("/roles/{id}", get(handlers::role::get_role)),
        state,
        require("role", "view"),
    );

    let create = guarded(
        Router::new().route("/roles", post(handlers::role::create_role)),
        state,
        require("role", "create"),
    );

    let update = guarded(
        Router::new().route("/roles/{id}", patch(handlers::role::update_role)),
        state,
        require("role", "update"),
    );

    let remove = guarded(
        Router::new().route("/roles/{id}", delete(handlers::role::delete_role)),
        state,
        require("role", "delete"),
    );

    view.merge(create).merge(update).merge(remove)
}

/// Permission catalog.
fn permission_routes(state: &AppState) -> Router<AppState> {
    guarded(
        Router::new().route("/permissions", get(handlers::permission::list_permissions)),
        state,
        require("role", "view"),
    )
}

/// Health probe.
fn health_routes(state: &AppState) -> Router<AppState> {
    guarded(
        Router::new().route("/health", get(handlers::health::health)),
        state,
        RoutePolicy::public(),
    )
}
