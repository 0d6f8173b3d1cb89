//! CORS configuration

use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Build the CORS layer from the configured allow-list
///
/// An empty list allows any origin. Origins that are not valid header
/// values are skipped.
pub fn build_cors(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        info!("CORS: allowing all origins");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Skipping invalid CORS origin");
                None
            },
        })
        .collect();

    info!(origins = ?origins, "CORS: restricting to allow-list");
    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}
