//! Application configuration
//!
//! Split into focused sub-modules:
//! - `server`: HTTP server settings
//! - `security`: shared secret gate
//! - `relay`: phone normalization, reconnects, PDF staging
//! - `gateway`: WhatsApp gateway connection
//!
//! Sources, lowest precedence first: built-in defaults, an optional
//! `config.toml`, `WA_RELAY__SECTION__KEY` variables, then the legacy
//! `BOT_SECRET`, `PORT` and `CORS_ORIGINS` variables.

mod gateway;
mod relay;
mod security;
mod server;

use std::{collections::HashMap, path::Path};

use config::{ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

pub use gateway::GatewayConfig;
pub use relay::RelayConfig;
pub use security::SecurityConfig;
pub use server::ServerConfig;

use crate::telemetry::TelemetryConfig;

/// Prefix of structured environment variables
pub const ENV_PREFIX: &str = "WA_RELAY";

/// Separator between prefix, section and key in environment variables
pub const ENV_SEPARATOR: &str = "__";

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Security configuration
    #[serde(default)]
    pub security: SecurityConfig,

    /// Relay configuration
    #[serde(default)]
    pub relay: RelayConfig,

    /// WhatsApp gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from `config.toml` (if present) and the process
    /// environment
    pub fn load() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::build(File::with_name("config").required(false), &vars)
    }

    /// Load configuration from an explicit file and variable set
    pub fn load_from(path: &Path, vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::build(File::from(path).required(false), vars)
    }

    fn build<F>(file: F, vars: &HashMap<String, String>) -> Result<Self, ConfigError>
    where
        F: config::Source + Send + Sync + 'static,
    {
        let cors_origins = vars.get("CORS_ORIGINS").map(|raw| split_origins(raw));

        let builder = config::Config::builder()
            // Start with defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3001)?
            // Load from file if exists
            .add_source(file)
            // Override with environment variables (e.g., WA_RELAY__SERVER__PORT)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true)
                    .source(Some(vars.clone())),
            )
            // Legacy variables win over everything else
            .set_override_option("security.bot_secret", vars.get("BOT_SECRET").cloned())?
            .set_override_option("server.port", vars.get("PORT").cloned())?
            .set_override_option("server.cors_origins", cors_origins)?;

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.security.trim_secret();
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the relay cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.poll_interval_secs == 0 {
            return Err(ConfigError::Message(
                "gateway.poll_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.gateway.reconnect_initial_delay_ms > self.gateway.reconnect_max_delay_ms {
            return Err(ConfigError::Message(
                "gateway.reconnect_initial_delay_ms must not exceed reconnect_max_delay_ms"
                    .to_string(),
            ));
        }
        if self.relay.file_prefix.trim().is_empty() {
            return Err(ConfigError::Message(
                "relay.file_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(ToString::to_string)
        .collect()
}
