//! Middleware: access enforcement, CORS, request logging.

pub mod access;
pub mod cors;
pub mod logging;

pub use access::{AccessState, enforce_access};
pub use cors::build_cors_layer;
