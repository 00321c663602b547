use std::io;
use std::sync::Arc;
use tracing::Dispatch;
use tracing_subscriber::layer::SubscriberExt;

use crate::error::LogError;
use crate::handler::{HandlerOptions, JsonHandler};
use crate::level::Severity;
use crate::sink::RotatingFileSink;

/// A configured logger.
///
/// A `Logger` can be handed to the code that should log through it and
/// entered with [`Logger::in_scope`], or installed as the process-wide default
/// with [`Logger::install`]. Cloning is cheap; clones share the same sink.
#[derive(Debug, Clone)]
pub struct Logger {
    handler: JsonHandler,
    dispatch: Dispatch,
}

impl Logger {
    pub(crate) fn new(handler: JsonHandler) -> Self {
        let dispatch = Dispatch::new(tracing_subscriber::registry().with(handler.clone()));
        Self { handler, dispatch }
    }

    #[must_use]
    pub fn min_level(&self) -> Severity {
        self.handler.options().min_level
    }

    #[must_use]
    pub fn options(&self) -> &HandlerOptions {
        self.handler.options()
    }

    #[must_use]
    pub fn handler(&self) -> &JsonHandler {
        &self.handler
    }

    #[must_use]
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// The rotating file behind this logger, when it writes to a file.
    #[must_use]
    pub fn file_sink(&self) -> Option<&Arc<RotatingFileSink>> {
        self.handler.writer().file_sink()
    }

    /// Runs `f` with this logger as the current thread's default.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Logs `message` at `severity` without attributes.
    pub fn log(&self, severity: Severity, message: &str) {
        self.in_scope(|| match severity {
            Severity::Trace => tracing::trace!("{message}"),
            Severity::Debug => tracing::debug!("{message}"),
            Severity::Info => tracing::info!("{message}"),
            Severity::Warn => tracing::warn!("{message}"),
            Severity::Error => tracing::error!("{message}"),
            Severity::Fatal => tracing::error!(severity.fatal = true, "{message}"),
        });
    }

    /// Logs `message` as fatal and exits the process with status 1.
    pub fn fatal(&self, message: &str) -> ! {
        self.log(Severity::Fatal, message);
        self.flush().ok();
        crate::fatal::exit_fatal()
    }

    /// Makes this logger the process-wide default, replacing any previous one.
    pub fn install(&self) -> Result<(), LogError> {
        crate::global::install(self)
    }

    pub fn flush(&self) -> io::Result<()> {
        self.handler.writer().flush()
    }

    /// Closes the log file, if this logger writes to one. Safe to call any
    /// number of times.
    ///
    /// Loggers built on the same path share one file, so this closes it for
    /// all of them.
    pub fn close(&self) -> io::Result<()> {
        match self.file_sink() {
            Some(sink) => sink.close(),
            None => Ok(()),
        }
    }
}
