//! WhatsApp session lifecycle
//!
//! Tracks the session state behind a watch channel and fans lifecycle
//! events out over a broadcast channel. [`SessionManager::apply`] is the
//! only place the state changes.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use domain::{ConnectionStatus, SessionEvent, SessionState};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, instrument, warn};

use crate::{error::ApplicationError, ports::MessagingClientPort};

/// Capacity of the lifecycle event channel
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Default first reconnect delay in milliseconds
const DEFAULT_INITIAL_DELAY_MS: u64 = 1_000;

/// Default reconnect delay cap in milliseconds
const DEFAULT_MAX_DELAY_MS: u64 = 60_000;

/// Exponential backoff between re-initialization attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before the first attempt
    pub initial_delay_ms: u64,
    /// Upper bound for any delay
    pub max_delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: DEFAULT_INITIAL_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before attempt number `attempt` (zero based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        // Cap the shift to avoid overflow
        let factor = 1_u64 << attempt.min(20);
        let ms = self
            .initial_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms);
        Duration::from_millis(ms)
    }
}

/// Session manager settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Re-initialize the session after a disconnect
    pub auto_reconnect: bool,
    /// Backoff between re-initialization attempts
    pub reconnect: ReconnectPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_reconnect: true,
            reconnect: ReconnectPolicy::default(),
        }
    }
}

struct Inner {
    client: Arc<dyn MessagingClientPort>,
    config: SessionConfig,
    state_tx: watch::Sender<SessionState>,
    events_tx: broadcast::Sender<SessionEvent>,
    reconnecting: AtomicBool,
}

/// Owner of the WhatsApp session state
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &self.state())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Create a manager in the `Initializing` state
    pub fn new(client: Arc<dyn MessagingClientPort>, config: SessionConfig) -> Self {
        let (state_tx, _) = watch::channel(SessionState::default());
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                client,
                config,
                state_tx,
                events_tx,
                reconnecting: AtomicBool::new(false),
            }),
        }
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        *self.inner.state_tx.borrow()
    }

    /// Whether messages can be sent right now
    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    /// Receive every lifecycle event applied from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events_tx.subscribe()
    }

    /// Watch state changes
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.inner.state_tx.subscribe()
    }

    /// Record a lifecycle event and publish it
    pub fn apply(&self, event: SessionEvent) {
        let next = event.resulting_state();
        let previous = self.inner.state_tx.send_replace(next);
        if previous != next {
            info!(from = %previous, to = %next, event = event.name(), "Session state changed");
        }

        let reconnect =
            self.inner.config.auto_reconnect && matches!(event, SessionEvent::Disconnected(_));

        // No subscribers is fine
        let _ = self.inner.events_tx.send(event);

        if reconnect {
            self.spawn_reconnect();
        }
    }

    /// Ask the gateway to bring the session up
    ///
    /// A failed start counts as a disconnect so that auto-reconnect keeps
    /// trying in the background.
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<(), ApplicationError> {
        info!("Initializing WhatsApp session");
        match self.inner.client.initialize().await {
            Ok(Some(code)) => self.apply(SessionEvent::Qr(code)),
            Ok(None) => debug!("Gateway returned no pairing code"),
            Err(ApplicationError::NotAuthorized(reason)) => {
                self.apply(SessionEvent::AuthFailure(reason.clone()));
                return Err(ApplicationError::NotAuthorized(reason));
            },
            Err(e) => {
                self.apply(SessionEvent::Disconnected(e.to_string()));
                return Err(e);
            },
        }

        self.poll().await.map(|_| ())
    }

    /// Query the gateway once and fold the status into the session
    pub async fn poll(&self) -> Result<ConnectionStatus, ApplicationError> {
        match self.inner.client.connection_status().await {
            Ok(status) => {
                self.observe(status);
                Ok(status)
            },
            Err(ApplicationError::NotAuthorized(reason)) => {
                if self.state() != SessionState::AuthFailed {
                    self.apply(SessionEvent::AuthFailure(reason.clone()));
                }
                Err(ApplicationError::NotAuthorized(reason))
            },
            Err(e) => Err(e),
        }
    }

    /// Translate a polled gateway status into lifecycle events
    ///
    /// Only transitions produce events. A closed connection while the
    /// session is still down re-arms the reconnect loop.
    pub fn observe(&self, status: ConnectionStatus) {
        let current = self.state();
        match (status, current) {
            (ConnectionStatus::Open, state) if !state.is_ready() => {
                self.apply(SessionEvent::Ready);
            },
            (ConnectionStatus::Connecting, SessionState::Ready) => {
                self.apply(SessionEvent::Disconnected(
                    "gateway is reconnecting".to_string(),
                ));
            },
            (ConnectionStatus::Closed, SessionState::Ready | SessionState::AwaitingPairing) => {
                self.apply(SessionEvent::Disconnected(
                    "gateway connection closed".to_string(),
                ));
            },
            (ConnectionStatus::Closed, SessionState::Initializing | SessionState::Disconnected)
                if self.inner.config.auto_reconnect =>
            {
                self.spawn_reconnect();
            },
            _ => {},
        }
    }

    fn spawn_reconnect(&self) {
        if self
            .inner
            .reconnecting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Reconnect already in progress");
            return;
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime available, skipping reconnect");
            self.inner.reconnecting.store(false, Ordering::Release);
            return;
        };

        let manager = self.clone();
        handle.spawn(async move {
            manager.reconnect().await;
            manager.inner.reconnecting.store(false, Ordering::Release);
        });
    }

    async fn reconnect(&self) {
        let policy = self.inner.config.reconnect;
        let mut attempt: u32 = 0;

        loop {
            let delay = policy.delay_for(attempt);
            debug!(attempt, delay_ms = delay.as_millis(), "Waiting before re-initialization");
            tokio::time::sleep(delay).await;

            if self.is_ready() {
                debug!("Session recovered on its own");
                return;
            }

            match self.inner.client.initialize().await {
                Ok(code) => {
                    info!(attempt, "Gateway accepted re-initialization");
                    if let Some(code) = code {
                        self.apply(SessionEvent::Qr(code));
                    }
                    return;
                },
                Err(e) => {
                    warn!(attempt, error = %e, "Re-initialization failed");
                    attempt = attempt.saturating_add(1);
                },
            }
        }
    }
}
