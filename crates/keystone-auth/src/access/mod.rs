//! Route access policies and the two-stage access decision pipeline.

pub mod pipeline;
pub mod policy;

pub use pipeline::{AccessDecision, AccessPipeline};
pub use policy::{RequiredPermission, RoutePolicy};
