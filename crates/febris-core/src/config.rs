//! Service configuration.
//!
//! Read from a TOML document; every section and key is optional.
//!
//! ```toml
//! [model]
//! dir = "models"
//! expected_sha256 = "4f1c…"   # refuse artifacts with a different fingerprint
//!
//! [logging]
//! filter = "info"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use febris_contracts::error::{FebrisError, FebrisResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub model: ModelConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory holding `fever_model.json`, `label_encoder.json`, and
    /// `feature_names.json`.
    pub dir: PathBuf,
    /// Pinned artifact fingerprint (lowercase hex SHA-256). Unset means any
    /// consistent artifact is accepted.
    pub expected_sha256: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("models"),
            expected_sha256: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `FebrisError::ConfigError` if the TOML is malformed or a key
    /// has the wrong type.
    pub fn from_toml_str(s: &str) -> FebrisResult<Self> {
        toml::from_str(s).map_err(|e| FebrisError::ConfigError {
            reason: format!("failed to parse service config TOML: {}", e),
        })
    }

    /// Read and parse the file at `path`.
    pub fn from_file(path: &Path) -> FebrisResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| FebrisError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }
}
