//! # keystone-api
//!
//! HTTP API layer for Keystone built on Axum.
//!
//! Routes are declared with per-route access policies resolved at router
//! construction; the access middleware runs the authentication/authorization
//! pipeline before any handler executes.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
