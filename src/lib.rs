//! Process-wide structured JSON logging on top of `tracing`.
//!
//! ```no_run
//! use loginit::{FileOutputConfig, Severity};
//!
//! let logger = loginit::builder()
//!     .level(Severity::Debug)
//!     .source(true)
//!     .file_output(FileOutputConfig::new("logs/app.log"))
//!     .init();
//!
//! tracing::info!(port = 8080, "listening");
//! logger.close().ok();
//! ```
//!
//! Records are written one JSON object per line. A file output rotates by
//! size and compresses and prunes its backups.
//! [`fatal`] and [`fatal!`] log at a level above `ERROR` and exit with
//! status 1.

// Allow panic/unwrap/expect in tests (denied globally via Cargo.toml lints)
#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::indexing_slicing,
        clippy::arithmetic_side_effects
    )
)]

pub mod builder;
pub mod config;
pub mod error;
pub mod fatal;
pub mod global;
pub mod handler;
pub mod level;
pub mod logger;
pub mod sink;
pub mod writer;

#[cfg(test)]
mod test_support;

pub use tracing;

pub use builder::LoggerBuilder;
pub use config::{load_config, FileOutputConfig, LoggerConfig, OutputConfig};
pub use error::LogError;
pub use fatal::{exit_after_fatal, fatal};
pub use global::{close, default_level};
pub use handler::{AttrRewrite, HandlerOptions, JsonHandler, TimeFormat};
pub use level::{Severity, FATAL_MARKER};
pub use logger::Logger;
pub use sink::{RotatingFileSink, RotationPolicy};
pub use writer::SinkWriter;

/// Start configuring a logger.
#[must_use]
pub fn builder() -> LoggerBuilder {
    LoggerBuilder::new()
}

/// Install the default logger: JSON on standard output at `INFO`.
pub fn init() -> Logger {
    builder().init()
}

/// Install a logger described by a [`LoggerConfig`].
///
/// # Errors
///
/// See [`LoggerBuilder::try_init`].
pub fn try_init_from_config(config: LoggerConfig) -> Result<Logger, LogError> {
    LoggerBuilder::from_config(config).try_init()
}
