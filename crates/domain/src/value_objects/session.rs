//! WhatsApp session lifecycle types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Connection state of the WhatsApp session, as seen by the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Process started, no lifecycle event received yet
    #[default]
    Initializing,
    /// Waiting for a phone to scan the pairing QR code
    AwaitingPairing,
    /// Authenticated and able to send
    Ready,
    /// Connection lost
    Disconnected,
    /// The client rejected the session credentials
    AuthFailed,
}

impl SessionState {
    /// Whether messages can be sent in this state
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Stable lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::AwaitingPairing => "awaiting_pairing",
            Self::Ready => "ready",
            Self::Disconnected => "disconnected",
            Self::AuthFailed => "auth_failed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle notification published by the session manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new pairing code must be scanned
    Qr(String),
    /// The session is connected and usable
    Ready,
    /// The client rejected the session credentials
    AuthFailure(String),
    /// The connection dropped
    Disconnected(String),
}

impl SessionEvent {
    /// State the session is in after this event
    #[must_use]
    pub const fn resulting_state(&self) -> SessionState {
        match self {
            Self::Qr(_) => SessionState::AwaitingPairing,
            Self::Ready => SessionState::Ready,
            Self::AuthFailure(_) => SessionState::AuthFailed,
            Self::Disconnected(_) => SessionState::Disconnected,
        }
    }

    /// Event name as used in logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Qr(_) => "qr",
            Self::Ready => "ready",
            Self::AuthFailure(_) => "auth_failure",
            Self::Disconnected(_) => "disconnected",
        }
    }
}

/// Raw connection status reported by the WhatsApp gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// Connected
    Open,
    /// Handshake or pairing in progress
    Connecting,
    /// Not connected
    Closed,
}

impl ConnectionStatus {
    /// Parse a gateway state string
    ///
    /// Unknown values count as closed.
    #[must_use]
    pub fn from_gateway(state: &str) -> Self {
        match state.trim().to_lowercase().as_str() {
            "open" | "connected" => Self::Open,
            "connecting" | "pairing" => Self::Connecting,
            _ => Self::Closed,
        }
    }
}
