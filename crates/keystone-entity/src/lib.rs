//! # keystone-entity
//!
//! Domain entity models for Keystone. Every struct in this crate represents
//! a database table row or a domain value object. Database entities derive
//! `sqlx::FromRow` in addition to `Debug`, `Clone`, `Serialize`,
//! `Deserialize`.

pub mod identity;
pub mod permission;
pub mod role;
pub mod token;
pub mod user;

pub use identity::Identity;
pub use permission::{AuthorizationSnapshot, Permission, PermissionGrant, PermissionSet};
pub use role::{Role, RoleSnapshot};
pub use token::{RefreshTokenRecord, TokenPair};
pub use user::User;
