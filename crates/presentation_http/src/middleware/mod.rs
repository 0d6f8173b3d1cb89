//! HTTP middleware components

pub mod auth;
pub mod cors;

pub use auth::{BOT_SECRET_HEADER, SharedSecretAuth, SharedSecretAuthLayer};
pub use cors::build_cors;
