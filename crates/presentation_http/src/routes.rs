//! Route definitions

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::{
    handlers,
    middleware::{SharedSecretAuthLayer, build_cors},
    state::AppState,
};

/// Create the main router with all routes
///
/// `/send` sits behind the shared secret gate; the probes do not.
pub fn create_router(state: AppState) -> Router {
    let auth = SharedSecretAuthLayer::from_config(&state.config.security);

    Router::new()
        // Health and status endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        // Relay
        .route("/send", post(handlers::send::send_message))
        .layer(auth)
        .with_state(state)
}

/// Router plus the server-wide middleware stack
///
/// CORS wraps the gate so preflight requests never need the secret.
pub fn create_app(state: AppState) -> Router {
    let max_body = state.config.server.max_body_size_bytes;
    let cors = build_cors(&state.config.server.cors_origins);

    // Last added = outermost
    create_router(state)
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
