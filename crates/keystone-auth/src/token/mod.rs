//! Signed token codec and the access/refresh token lifecycle.

pub mod claims;
pub mod cleanup;
pub mod codec;
pub mod manager;

pub use claims::Claims;
pub use cleanup::RefreshTokenCleanup;
pub use codec::TokenCodec;
pub use manager::{REFRESH_TTL_DAYS, TokenManager};
