//! WhatsApp gateway connection settings.

use application::ReconnectPolicy;
use integration_whatsapp::WhatsAppClientConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// WhatsApp gateway configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway REST base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Gateway API key (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Instance holding the linked session
    #[serde(default = "default_instance")]
    pub instance: String,

    /// Seconds between connection status polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// First reconnect delay in milliseconds
    #[serde(default = "default_initial_delay")]
    pub reconnect_initial_delay_ms: u64,

    /// Reconnect delay cap in milliseconds
    #[serde(default = "default_max_delay")]
    pub reconnect_max_delay_ms: u64,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field(
                "api_key",
                &if self.api_key.is_some() {
                    Some("[REDACTED]")
                } else {
                    None
                },
            )
            .field("instance", &self.instance)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("reconnect_initial_delay_ms", &self.reconnect_initial_delay_ms)
            .field("reconnect_max_delay_ms", &self.reconnect_max_delay_ms)
            .finish()
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_instance() -> String {
    "wa-relay".to_string()
}

const fn default_poll_interval() -> u64 {
    5
}

const fn default_request_timeout() -> u64 {
    30
}

const fn default_initial_delay() -> u64 {
    1_000
}

const fn default_max_delay() -> u64 {
    60_000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            instance: default_instance(),
            poll_interval_secs: default_poll_interval(),
            request_timeout_secs: default_request_timeout(),
            reconnect_initial_delay_ms: default_initial_delay(),
            reconnect_max_delay_ms: default_max_delay(),
        }
    }
}

impl GatewayConfig {
    /// Build the gateway client configuration
    #[must_use]
    pub fn client_config(&self) -> WhatsAppClientConfig {
        WhatsAppClientConfig {
            base_url: self.base_url.clone(),
            api_key: self
                .api_key
                .as_ref()
                .map(|key| key.expose_secret().to_owned())
                .unwrap_or_default(),
            instance: self.instance.clone(),
            timeout_secs: self.request_timeout_secs,
        }
    }

    /// Backoff used when re-initializing the session
    #[must_use]
    pub const fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            initial_delay_ms: self.reconnect_initial_delay_ms,
            max_delay_ms: self.reconnect_max_delay_ms,
        }
    }
}
