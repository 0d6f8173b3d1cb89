//! Relay behaviour: phone normalization, reconnects, PDF staging.

use std::path::PathBuf;

use domain::NormalizationMode;
use serde::{Deserialize, Serialize};

use super::default_true;

/// Relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// How unrecognized phone shapes are treated (default: lenient)
    #[serde(default)]
    pub phone_mode: NormalizationMode,

    /// Re-initialize the session after a disconnect (default: true)
    #[serde(default = "default_true")]
    pub auto_reconnect: bool,

    /// Directory for downloaded PDFs, created on demand
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// File name prefix for downloaded PDFs
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Timeout for PDF downloads in seconds (unset = client default)
    #[serde(default)]
    pub pdf_fetch_timeout_secs: Option<u64>,
}

fn default_temp_dir() -> PathBuf {
    PathBuf::from("tmp")
}

fn default_file_prefix() -> String {
    "receipt".to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            phone_mode: NormalizationMode::default(),
            auto_reconnect: true,
            temp_dir: default_temp_dir(),
            file_prefix: default_file_prefix(),
            pdf_fetch_timeout_secs: None,
        }
    }
}
