//! Assembly of a [`Logger`] from individual options.
//!
//! Options may be given in any order. The sink is opened in
//! [`LoggerBuilder::build`], after every other option has been recorded, so a
//! level set after `file_output` still applies to the file. When several sink
//! options are given the last one wins.

use serde_json::Value;
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

use crate::config::{create_log_dir, resolve_log_path, FileOutputConfig, LoggerConfig, OutputConfig};
use crate::error::LogError;
use crate::handler::{HandlerOptions, JsonHandler, TimeFormat};
use crate::level::Severity;
use crate::logger::Logger;
use crate::sink::{RotatingFileSink, RotationPolicy};
use crate::writer::SinkWriter;

#[derive(Debug, Default)]
enum Output {
    #[default]
    Stdout,
    Stderr,
    Stream(SinkWriter),
    File(FileOutputConfig),
}

/// Collects logger options; see the [module docs](self).
#[derive(Debug, Default)]
pub struct LoggerBuilder {
    options: HandlerOptions,
    time_format: Option<String>,
    output: Output,
}

impl LoggerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder preloaded with a loaded [`LoggerConfig`].
    #[must_use]
    pub fn from_config(config: LoggerConfig) -> Self {
        let builder = Self::new().level(config.level).source(config.add_source);
        let builder = match config.time_format {
            Some(pattern) => builder.time_format(pattern),
            None => builder,
        };
        match config.output {
            OutputConfig::Stdout => builder.stdout(),
            OutputConfig::Stderr => builder.stderr(),
            OutputConfig::File(file) => builder.file_output(file),
        }
    }

    /// Drops records below `level`.
    #[must_use]
    pub fn level(mut self, level: Severity) -> Self {
        self.options.min_level = level;
        self
    }

    /// Sets the minimum level from `level_fn`, called once right here.
    #[must_use]
    pub fn level_fn(self, level_fn: impl FnOnce() -> Severity) -> Self {
        let level = level_fn();
        self.level(level)
    }

    #[must_use]
    pub fn stdout(mut self) -> Self {
        self.output = Output::Stdout;
        self
    }

    #[must_use]
    pub fn stderr(mut self) -> Self {
        self.output = Output::Stderr;
        self
    }

    /// Writes records to `writer`, one flushed line at a time.
    #[must_use]
    pub fn output<W: Write + Send + 'static>(mut self, writer: W) -> Self {
        self.output = Output::Stream(SinkWriter::stream(writer));
        self
    }

    /// Writes records to a rotating file.
    #[must_use]
    pub fn file_output(mut self, config: FileOutputConfig) -> Self {
        self.output = Output::File(config);
        self
    }

    /// Adds the `source` attribute (file, line, module) to every record.
    #[must_use]
    pub fn source(mut self, add_source: bool) -> Self {
        self.options.add_source = add_source;
        self
    }

    /// Renders `time` with a chrono strftime pattern, e.g. `%Y-%m-%d`.
    #[must_use]
    pub fn time_format(mut self, pattern: impl Into<String>) -> Self {
        self.time_format = Some(pattern.into());
        self
    }

    /// Passes every top-level attribute through `rewrite` before it is written.
    ///
    /// Runs after `time_format`, so it sees the formatted timestamp.
    #[must_use]
    pub fn replace_attr(
        mut self,
        rewrite: impl Fn(&str, Value) -> Option<Value> + Send + Sync + 'static,
    ) -> Self {
        self.options.replace_attr = Some(Arc::new(rewrite));
        self
    }

    /// Validates the options and opens the sink.
    ///
    /// # Errors
    ///
    /// Returns [`LogError`] for an invalid time format, or when the log file's
    /// directory cannot be resolved, created, or the file cannot be opened.
    pub fn build(self) -> Result<Logger, LogError> {
        let mut options = self.options;
        if let Some(pattern) = &self.time_format {
            options.time_format = Some(TimeFormat::new(pattern)?);
        }

        let writer = match self.output {
            Output::Stdout => SinkWriter::Stdout,
            Output::Stderr => SinkWriter::Stderr,
            Output::Stream(writer) => writer,
            Output::File(config) => SinkWriter::File(open_file_sink(&config)?),
        };

        Ok(Logger::new(JsonHandler::new(writer, options)))
    }

    /// Builds the logger and installs it as the process-wide default.
    ///
    /// # Errors
    ///
    /// See [`LoggerBuilder::build`]; also fails if a global subscriber not
    /// installed by this crate is already set.
    pub fn try_init(self) -> Result<Logger, LogError> {
        let logger = self.build()?;
        logger.install()?;
        debug!(
            target: "loginit",
            level = %logger.min_level(),
            output = logger.handler().writer().kind(),
            "logger installed"
        );
        Ok(logger)
    }

    /// Like [`LoggerBuilder::try_init`], but a configuration error ends the
    /// process: the error is printed to stderr and the exit status is 1.
    pub fn init(self) -> Logger {
        match self.try_init() {
            Ok(logger) => logger,
            Err(err) => {
                eprintln!("loginit: unable to configure logging: {err}");
                crate::fatal::exit_fatal()
            }
        }
    }
}

/// Resolves the path, creates its directory, and opens the sink, sharing one
/// that is already open on the same file.
pub(crate) fn open_file_sink(
    config: &FileOutputConfig,
) -> Result<Arc<RotatingFileSink>, LogError> {
    let path = resolve_log_path(&config.filename)?;
    create_log_dir(&path)?;
    RotatingFileSink::shared(&path, RotationPolicy::from_config(config))
        .map_err(|source| LogError::OpenFile { path, source })
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
