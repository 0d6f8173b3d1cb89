//! WhatsApp relay HTTP presentation layer
//!
//! This crate provides the relay's HTTP API: the probes, the shared secret
//! gate and the `/send` endpoint, plus the session background tasks.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod tasks;

pub use error::{ApiError, ErrorResponse};
pub use middleware::{BOT_SECRET_HEADER, SharedSecretAuthLayer, build_cors};
pub use routes::{create_app, create_router};
pub use state::AppState;
pub use tasks::{render_qr, spawn_session_event_logger, spawn_session_monitor_task};
