//! Repository implementations. Each repository owns the SQL for one table
//! family and maps driver errors into [`keystone_core::AppError`].

pub mod permission;
pub mod refresh_token;
pub mod role;
pub mod user;

pub use permission::PermissionRepository;
pub use refresh_token::RefreshTokenRepository;
pub use role::RoleRepository;
pub use user::UserRepository;
