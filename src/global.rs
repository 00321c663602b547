//! The process-wide default logger.
//!
//! `tracing` accepts a global subscriber only once per process, so the first
//! installation sets a registry whose handler layer sits behind a
//! [`reload`] handle. Every later installation swaps the handler through that
//! handle, dropping the previous one.

use std::io;
use std::sync::{Mutex, OnceLock, PoisonError};
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{reload, Registry};

use crate::error::LogError;
use crate::handler::JsonHandler;
use crate::level::Severity;
use crate::logger::Logger;
use crate::writer::SinkWriter;

struct Installed {
    min_level: Severity,
    writer: SinkWriter,
}

static INSTALL_LOCK: Mutex<()> = Mutex::new(());
static RELOAD: OnceLock<reload::Handle<JsonHandler, Registry>> = OnceLock::new();
static CURRENT: Mutex<Option<Installed>> = Mutex::new(None);

/// Makes `logger` the default for every thread.
pub(crate) fn install(logger: &Logger) -> Result<(), LogError> {
    let _guard = INSTALL_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let handler = logger.handler().clone();

    if let Some(handle) = RELOAD.get() {
        handle.reload(handler)?;
    } else {
        let (layer, handle) = reload::Layer::new(handler);
        tracing_subscriber::registry()
            .with(layer)
            .with(ErrorLayer::default())
            .try_init()?;
        // only set while INSTALL_LOCK is held, so this cannot race
        RELOAD.set(handle).ok();
    }

    *CURRENT.lock().unwrap_or_else(PoisonError::into_inner) = Some(Installed {
        min_level: logger.min_level(),
        writer: logger.handler().writer().clone(),
    });
    Ok(())
}

/// Minimum severity of the installed default logger, if there is one.
#[must_use]
pub fn default_level() -> Option<Severity> {
    CURRENT
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .map(|installed| installed.min_level)
}

/// Closes the log file of the default logger.
///
/// Does nothing when the default logger does not write to a file or the file
/// is already closed.
///
/// # Errors
///
/// Returns the error of the final flush on the first effective call.
pub fn close() -> io::Result<()> {
    let sink = CURRENT
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .and_then(|installed| installed.writer.file_sink().cloned());
    match sink {
        Some(sink) => sink.close(),
        None => Ok(()),
    }
}

pub(crate) fn flush() {
    let writer = CURRENT
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .map(|installed| installed.writer.clone());
    if let Some(writer) = writer {
        writer.flush().ok();
    }
}
