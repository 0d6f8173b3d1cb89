//! Session event logging background task
//!
//! Subscribes to the session manager's event channel, logs every lifecycle
//! event and prints pairing codes as a scannable terminal QR block.

use application::SessionManager;
use domain::SessionEvent;
use fast_qr::{ECL, qr::QRBuilder};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

/// Render a pairing code as a terminal QR block
pub fn render_qr(code: &str) -> Result<String, fast_qr::qr::QRCodeError> {
    let qr = QRBuilder::new(code).ecl(ECL::L).build()?;
    Ok(qr.to_str())
}

#[allow(clippy::print_stdout)]
fn log_event(event: &SessionEvent) {
    match event {
        SessionEvent::Qr(code) => {
            info!(event = event.name(), "Scan the QR code with WhatsApp to link the relay");
            match render_qr(code) {
                Ok(block) => println!("{block}"),
                Err(e) => warn!(error = ?e, code = %code, "Could not render QR code"),
            }
        },
        SessionEvent::Ready => info!(event = event.name(), "WhatsApp client is ready"),
        SessionEvent::AuthFailure(reason) => {
            error!(event = event.name(), reason = %reason, "WhatsApp authentication failed");
        },
        SessionEvent::Disconnected(reason) => {
            warn!(event = event.name(), reason = %reason, "WhatsApp client disconnected");
        },
    }
}

/// Spawn a background task that logs session lifecycle events.
///
/// The subscription is taken before spawning so no event published after
/// this call is missed.
pub fn spawn_session_event_logger(session: &SessionManager) -> tokio::task::JoinHandle<()> {
    let mut events = session.subscribe();

    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => log_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Session event logger fell behind");
                },
                Err(RecvError::Closed) => {
                    info!("Session event channel closed, stopping logger");
                    break;
                },
            }
        }
    })
}
