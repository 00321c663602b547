use std::fs::DirBuilder;
use std::path::{Path, PathBuf};

use crate::error::LogError;

/// Absolute path of a log file: absolute filenames are kept, relative ones
/// are joined onto the current working directory.
pub fn resolve_log_path(filename: &Path) -> Result<PathBuf, LogError> {
    if filename.is_absolute() {
        return Ok(filename.to_path_buf());
    }
    let current_dir = std::env::current_dir().map_err(LogError::WorkingDirectory)?;
    Ok(current_dir.join(filename))
}

/// Creates the directory holding `log_path` and any missing parents.
///
/// Succeeds when the directory already exists.
pub fn create_log_dir(log_path: &Path) -> Result<(), LogError> {
    let Some(dir) = log_path.parent() else {
        return Ok(());
    };
    if dir.as_os_str().is_empty() {
        return Ok(());
    }

    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder
        .create(dir)
        .map_err(|source| LogError::CreateDirectory {
            path: dir.to_path_buf(),
            source,
        })
}
