//! Application state shared across handlers

use std::sync::Arc;

use application::{RelayService, SessionManager};
use infrastructure::AppConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Send orchestration
    pub relay_service: Arc<RelayService>,
    /// WhatsApp session lifecycle, read by the probes
    pub session: SessionManager,
    /// Application configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Build state around a relay service, sharing its session
    pub fn new(relay_service: Arc<RelayService>, config: Arc<AppConfig>) -> Self {
        Self {
            session: relay_service.session().clone(),
            relay_service,
            config,
        }
    }
}
