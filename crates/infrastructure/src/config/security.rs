//! Security configuration: the shared secret gating `/send`.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::default_true;

/// Security configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Shared secret expected in the `x-bot-secret` header (sensitive)
    ///
    /// Trimmed at load time. Empty or unset rejects every gated request.
    #[serde(default, skip_serializing)]
    pub bot_secret: Option<SecretString>,

    /// Whether `/send` requires the shared secret (default: true)
    #[serde(default = "default_true")]
    pub require_auth: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            bot_secret: None,
            require_auth: true,
        }
    }
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field(
                "bot_secret",
                &if self.has_secret() {
                    Some("[REDACTED]")
                } else {
                    None
                },
            )
            .field("require_auth", &self.require_auth)
            .finish()
    }
}

impl SecurityConfig {
    /// Configured secret, empty when unset
    #[must_use]
    pub fn secret(&self) -> &str {
        self.bot_secret
            .as_ref()
            .map_or("", |secret| secret.expose_secret())
    }

    /// Whether a non-empty secret is configured
    #[must_use]
    pub fn has_secret(&self) -> bool {
        !self.secret().is_empty()
    }

    /// Length of the configured secret, for startup logging
    #[must_use]
    pub fn secret_len(&self) -> usize {
        self.secret().len()
    }

    pub(crate) fn trim_secret(&mut self) {
        if let Some(secret) = &self.bot_secret {
            let trimmed = secret.expose_secret().trim();
            self.bot_secret = if trimmed.is_empty() {
                None
            } else {
                Some(SecretString::from(trimmed.to_owned()))
            };
        }
    }
}
