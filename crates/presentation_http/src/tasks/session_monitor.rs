//! Gateway status polling background task
//!
//! Periodically asks the gateway for its connection status and feeds it to
//! the session manager, which turns transitions into lifecycle events.

use std::time::Duration;

use application::SessionManager;
use tracing::{debug, info};

/// Spawn a background task that polls the gateway connection status.
///
/// Poll failures are logged at debug level and the task keeps running.
///
/// Returns a `JoinHandle` that can be used to abort the task on shutdown.
pub fn spawn_session_monitor_task(
    session: SessionManager,
    poll_interval: Duration,
) -> tokio::task::JoinHandle<()> {
    info!(
        interval_secs = poll_interval.as_secs(),
        "Starting gateway status polling task"
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(poll_interval);
        // First tick completes immediately; start() already polled once.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match session.poll().await {
                Ok(status) => debug!(?status, state = %session.state(), "Gateway status polled"),
                Err(e) => debug!(error = %e, "Gateway status poll failed"),
            }
        }
    })
}
