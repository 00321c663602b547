use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Unable to get current working directory: {0}")]
    WorkingDirectory(#[source] std::io::Error),

    #[error("Unable to create log directory {}: {source}", .path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to open log file {}: {source}", .path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid time format '{0}'")]
    InvalidTimeFormat(String),

    #[error("Invalid log level '{0}'")]
    InvalidLevel(String),

    #[error("Failed to read logger config {}: {source}", .path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse logger config TOML: {0}")]
    ParseConfig(#[from] toml::de::Error),

    #[error("Failed to install the default logger: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),

    #[error("Failed to replace the default logger: {0}")]
    Reload(#[from] tracing_subscriber::reload::Error),
}
