//! # keystone-database
//!
//! PostgreSQL access layer: connection pool management, migration runner,
//! and the repositories owning all SQL in the workspace.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::create_pool;
