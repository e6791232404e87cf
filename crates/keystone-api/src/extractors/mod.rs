//! Axum extractors.

pub mod identity;

pub use identity::CurrentUser;
