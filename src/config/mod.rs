//! Logger configuration loaded from TOML.
//!
//! The file mirrors the builder options:
//!
//! ```toml
//! level = "debug"
//! add_source = true
//! time_format = "%Y-%m-%d %H:%M:%S"
//!
//! [output]
//! kind = "file"
//! filename = "logs/app.log"
//! max_size_mb = 10
//! max_backups = 3
//! ```
//!
//! Every field is optional; a missing `[output]` table means standard output.

mod file;
mod path;

pub use file::FileOutputConfig;
pub use path::{create_log_dir, resolve_log_path};

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::LogError;
use crate::level::Severity;

/// Destination of log records in a [`LoggerConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OutputConfig {
    #[default]
    Stdout,
    Stderr,
    File(FileOutputConfig),
}

/// Serializable form of the logger options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggerConfig {
    pub level: Severity,
    pub add_source: bool,
    /// A `chrono` strftime pattern for the `time` attribute.
    pub time_format: Option<String>,
    pub output: OutputConfig,
}

impl LoggerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, LogError> {
        Ok(toml::from_str(content)?)
    }
}

/// Load a [`LoggerConfig`] from a TOML file.
///
/// # Errors
///
/// Returns [`LogError`] if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<LoggerConfig, LogError> {
    let content = std::fs::read_to_string(path).map_err(|source| LogError::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;
    let config = LoggerConfig::from_toml_str(&content)?;
    debug!("Loaded logger config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
#[path = "../config_tests.rs"]
mod tests;
