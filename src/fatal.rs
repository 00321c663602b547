/// Logs `message` at [`Severity::Fatal`](crate::Severity::Fatal) through the
/// default logger, then exits the process with status 1.
pub fn fatal(message: &str) -> ! {
    tracing::error!(severity.fatal = true, "{message}");
    exit_after_fatal()
}

/// Flushes the default logger and exits with status 1.
#[doc(hidden)]
pub fn exit_after_fatal() -> ! {
    crate::global::flush();
    exit_fatal()
}

#[allow(clippy::exit)]
pub(crate) fn exit_fatal() -> ! {
    std::process::exit(1)
}

/// Logs a fatal event through the default logger and exits with status 1.
///
/// Accepts the same arguments as [`tracing::error!`]:
///
/// ```no_run
/// loginit::fatal!(path = "/etc/app.toml", "config missing");
/// ```
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)+) => {{
        $crate::tracing::error!(severity.fatal = true, $($arg)+);
        $crate::exit_after_fatal()
    }};
}
