use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where and how long file output is kept.
///
/// `filename` may be absolute or relative; relative paths are resolved against
/// the current working directory when the logger is built, so `logs/app.log`
/// lands in `<cwd>/logs/app.log`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    pub filename: PathBuf,
    /// Maximum size in megabytes before the file is rotated.
    pub max_size_mb: u64,
    /// Maximum number of rotated files to keep; 0 keeps all of them.
    pub max_backups: usize,
    /// Maximum number of days to keep rotated files; 0 keeps them forever.
    pub max_age_days: u32,
    /// Gzip rotated files.
    pub compress: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            filename: PathBuf::new(),
            max_size_mb: 100,
            max_backups: 0,
            max_age_days: 28,
            compress: true,
        }
    }
}

impl FileOutputConfig {
    /// The default retention policy for `filename`.
    #[must_use]
    pub fn new(filename: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }
}
