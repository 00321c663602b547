//! Age limit for rotated log files.
//!
//! The rotator only limits backups by count, so backups whose last
//! modification is older than `max_age_days` are removed here.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use super::{RotationPolicy, Rotator};

const DAY: Duration = Duration::from_secs(86_400);

/// Removes the backups of `path` that expired before `now` and reopens the
/// rotator so that it rescans the ones left.
pub(super) fn prune_expired(
    rotator: &mut Rotator,
    path: &Path,
    policy: &RotationPolicy,
    now: SystemTime,
) -> io::Result<()> {
    if policy.max_age_days == 0 {
        return Ok(());
    }
    let Some(cutoff) = DAY
        .checked_mul(policy.max_age_days)
        .and_then(|max_age| now.checked_sub(max_age))
    else {
        return Ok(());
    };

    let expired: Vec<PathBuf> = rotator
        .log_paths()
        .into_iter()
        .filter(|backup| modified(backup).is_some_and(|time| time < cutoff))
        .collect();
    if expired.is_empty() {
        return Ok(());
    }

    let removed = expired.iter().try_for_each(|backup| remove_backup(backup));
    *rotator = policy.rotator(path);
    removed
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|metadata| metadata.modified()).ok()
}

fn remove_backup(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}
