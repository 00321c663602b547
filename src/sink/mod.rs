//! Size-based rotating log file.
//!
//! Rolling and compression are done by [`file_rotate`]. Once the active file
//! has grown past the configured size, the next write renames it to
//! `app.log.1`, shifting older backups up by one, and deletes the backups past
//! the count limit. With compression on, every backup is gzipped as it is
//! rotated (`app.log.1.gz`). Backups past the age limit are pruned in
//! [`retention`] when the sink opens and about once per rotation.

mod retention;

use file_rotate::compression::Compression;
use file_rotate::suffix::AppendCount;
use file_rotate::{ContentLimit, FileRotate};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::SystemTime;

use crate::config::FileOutputConfig;

const MEGABYTE: u64 = 1024 * 1024;
const DEFAULT_MAX_SIZE_MB: u64 = 100;

type Rotator = FileRotate<AppendCount>;

/// Sinks currently open in this process, keyed by canonical path.
static OPEN_SINKS: Mutex<BTreeMap<PathBuf, Weak<RotatingFileSink>>> =
    Mutex::new(BTreeMap::new());

/// Retention settings of a [`RotatingFileSink`], resolved from a [`FileOutputConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Size in bytes a file may grow past before it is rotated.
    pub max_size: u64,
    /// Backups to keep; 0 keeps all of them.
    pub max_backups: usize,
    /// Days to keep backups; 0 keeps them forever.
    pub max_age_days: u32,
    pub compress: bool,
}

impl RotationPolicy {
    /// A `max_size_mb` of 0 falls back to 100 MB.
    #[must_use]
    pub fn from_config(config: &FileOutputConfig) -> Self {
        let max_size_mb = if config.max_size_mb == 0 {
            DEFAULT_MAX_SIZE_MB
        } else {
            config.max_size_mb
        };
        Self {
            max_size: max_size_mb.saturating_mul(MEGABYTE),
            max_backups: config.max_backups,
            max_age_days: config.max_age_days,
            compress: config.compress,
        }
    }

    fn rotator(&self, path: &Path) -> Rotator {
        let max_files = if self.max_backups == 0 {
            usize::MAX
        } else {
            self.max_backups
        };
        let compression = if self.compress {
            Compression::OnRotate(0)
        } else {
            Compression::None
        };
        FileRotate::new(
            path,
            AppendCount::new(max_files),
            ContentLimit::BytesSurpassed(usize::try_from(self.max_size).unwrap_or(usize::MAX)),
            compression,
            #[cfg(unix)]
            None,
        )
    }
}

struct ActiveFile {
    rotator: Option<Rotator>,
    /// Bytes written since backups were last checked for age.
    since_prune: u64,
}

/// An appendable log file that rotates itself by size.
///
/// Safe to share between threads; every write holds an internal lock.
pub struct RotatingFileSink {
    path: PathBuf,
    policy: RotationPolicy,
    state: Mutex<ActiveFile>,
    closed: AtomicBool,
}

impl std::fmt::Debug for RotatingFileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingFileSink")
            .field("path", &self.path)
            .field("policy", &self.policy)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "log file sink is closed")
}

/// `path` with its directory resolved through symlinks; the file itself may
/// not exist yet.
fn canonical_file_path(path: &Path) -> io::Result<PathBuf> {
    match (path.parent(), path.file_name()) {
        (Some(dir), Some(name)) if !dir.as_os_str().is_empty() => {
            Ok(fs::canonicalize(dir)?.join(name))
        }
        _ => Ok(path.to_path_buf()),
    }
}

impl RotatingFileSink {
    /// Opens `path` for appending, creating it if needed. The parent directory
    /// must already exist.
    ///
    /// Prefer [`RotatingFileSink::shared`]: two sinks rotating the same file
    /// rename it under each other.
    pub fn open(path: impl Into<PathBuf>, policy: RotationPolicy) -> io::Result<Self> {
        let path = path.into();
        // the rotator opens lazily and would only fail on the first write
        OpenOptions::new().create(true).append(true).open(&path)?;

        let mut rotator = policy.rotator(&path);
        retention::prune_expired(&mut rotator, &path, &policy, SystemTime::now())?;

        Ok(Self {
            path,
            policy,
            state: Mutex::new(ActiveFile {
                rotator: Some(rotator),
                since_prune: 0,
            }),
            closed: AtomicBool::new(false),
        })
    }

    /// The sink already open on `path` in this process, or a new one.
    ///
    /// A sink that is reused keeps the policy it was opened with.
    pub fn shared(path: &Path, policy: RotationPolicy) -> io::Result<Arc<Self>> {
        let key = canonical_file_path(path)?;
        let mut open = OPEN_SINKS.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(sink) = open.get(&key).and_then(Weak::upgrade) {
            if !sink.is_closed() {
                return Ok(sink);
            }
        }

        open.retain(|_, sink| sink.upgrade().is_some_and(|sink| !sink.is_closed()));
        let sink = Arc::new(Self::open(path, policy)?);
        open.insert(key, Arc::downgrade(&sink));
        Ok(sink)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn policy(&self) -> RotationPolicy {
        self.policy
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn lock_state(&self) -> MutexGuard<'_, ActiveFile> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends and flushes `buf` in full. The file is rotated before the
    /// first write that finds it past the maximum size.
    ///
    /// # Errors
    ///
    /// Fails when the sink is closed or on any I/O error.
    pub fn append(&self, buf: &[u8]) -> io::Result<usize> {
        if self.is_closed() {
            return Err(closed_error());
        }

        let mut guard = self.lock_state();
        let active = &mut *guard;
        let rotator = active.rotator.as_mut().ok_or_else(closed_error)?;
        rotator.write_all(buf)?;
        rotator.flush()?;

        let len = u64::try_from(buf.len()).unwrap_or(u64::MAX);
        active.since_prune = active.since_prune.saturating_add(len);
        if active.since_prune >= self.policy.max_size {
            active.since_prune = 0;
            // the record is written; an age pruning failure is not its error
            if let Err(err) =
                retention::prune_expired(rotator, &self.path, &self.policy, SystemTime::now())
            {
                eprintln!(
                    "loginit: failed to prune backups of {}: {err}",
                    self.path.display()
                );
            }
        }
        Ok(buf.len())
    }

    /// Rotates the active file now, regardless of its size.
    ///
    /// # Errors
    ///
    /// Fails when the sink is closed or the rotation fails.
    pub fn rotate(&self) -> io::Result<()> {
        if self.is_closed() {
            return Err(closed_error());
        }
        let mut guard = self.lock_state();
        let active = &mut *guard;
        let rotator = active.rotator.as_mut().ok_or_else(closed_error)?;
        rotator.rotate()?;
        active.since_prune = 0;
        retention::prune_expired(rotator, &self.path, &self.policy, SystemTime::now())
    }

    /// Flushes the file and releases its handle.
    ///
    /// Only the first call has any effect; later and concurrent calls return
    /// `Ok(())` immediately.
    ///
    /// # Errors
    ///
    /// Returns the error of the final flush.
    pub fn close(&self) -> io::Result<()> {
        if self
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(());
        }

        let rotator = self.lock_state().rotator.take();
        match rotator {
            Some(mut rotator) => rotator.flush(),
            None => Ok(()),
        }
    }
}

impl Write for &RotatingFileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.lock_state().rotator.as_mut() {
            Some(rotator) => rotator.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            eprintln!("loginit: failed to close {}: {err}", self.path.display());
        }
    }
}

#[cfg(test)]
#[path = "../sink_tests.rs"]
mod tests;
