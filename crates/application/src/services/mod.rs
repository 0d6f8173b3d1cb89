//! Application services
//!
//! Services orchestrate domain logic and coordinate between ports.

mod relay_service;
mod session_manager;

pub use relay_service::RelayService;
pub use session_manager::{ReconnectPolicy, SessionConfig, SessionManager};
