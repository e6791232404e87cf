//! # keystone-auth
//!
//! The access-control engine: token lifecycle, permission resolution, and
//! the two-stage access decision pipeline every protected request passes
//! through.
//!
//! ## Modules
//!
//! - `token` — signed token codec, the login/refresh lifecycle, cleanup
//! - `permission` — effective permission resolution with wildcard grants
//! - `access` — route policies and the authentication/authorization pipeline
//! - `password` — Argon2id hashing and password policy
//! - `recovery` — password-reset token issuance via the mail collaborator
//! - `store` — the identity store interface and its implementations

pub mod access;
pub mod password;
pub mod permission;
pub mod recovery;
pub mod store;
pub mod token;

pub use access::{AccessDecision, AccessPipeline, RequiredPermission, RoutePolicy};
pub use password::{PasswordHasher, PasswordPolicy};
pub use permission::PermissionResolver;
pub use recovery::PasswordRecovery;
pub use store::{IdentityStore, MemoryIdentityStore, PgIdentityStore};
pub use token::{Claims, RefreshTokenCleanup, TokenCodec, TokenManager};
