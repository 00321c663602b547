use chrono::{DateTime, Local, SecondsFormat};
use std::fmt::Write;

use crate::error::LogError;

/// A validated strftime pattern for the `time` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeFormat {
    pattern: String,
}

impl TimeFormat {
    /// # Errors
    ///
    /// Returns [`LogError::InvalidTimeFormat`] if chrono cannot render the
    /// pattern. That covers malformed patterns and parse-only ones such as
    /// `%#z`.
    pub fn new(pattern: &str) -> Result<Self, LogError> {
        let mut sample = String::new();
        if write!(sample, "{}", Local::now().format(pattern)).is_err() {
            return Err(LogError::InvalidTimeFormat(pattern.to_string()));
        }
        Ok(Self {
            pattern: pattern.to_string(),
        })
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Falls back to the default timestamp if chrono cannot render `time`.
    #[must_use]
    pub fn render(&self, time: &DateTime<Local>) -> String {
        let mut rendered = String::new();
        match write!(rendered, "{}", time.format(&self.pattern)) {
            Ok(()) => rendered,
            Err(_) => render_default(time),
        }
    }
}

/// Timestamp used when no [`TimeFormat`] is configured.
pub(crate) fn render_default(time: &DateTime<Local>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, false)
}
