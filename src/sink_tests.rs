use super::*;
use flate2::read::GzDecoder;
use std::io::Read;
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

fn policy(max_size: u64) -> RotationPolicy {
    RotationPolicy {
        max_size,
        max_backups: 0,
        max_age_days: 0,
        compress: false,
    }
}

fn backup(path: &Path, index: usize) -> PathBuf {
    PathBuf::from(format!("{}.{index}", path.display()))
}

#[test]
fn test_policy_from_config() {
    let config = FileOutputConfig {
        max_size_mb: 5,
        max_backups: 3,
        ..FileOutputConfig::new("app.log")
    };
    let policy = RotationPolicy::from_config(&config);
    assert_eq!(policy.max_size, 5 * 1024 * 1024);
    assert_eq!(policy.max_backups, 3);
    assert_eq!(policy.max_age_days, 28);
    assert!(policy.compress);
}

#[test]
fn test_policy_zero_size_uses_default() {
    let config = FileOutputConfig {
        max_size_mb: 0,
        ..FileOutputConfig::new("app.log")
    };
    assert_eq!(RotationPolicy::from_config(&config).max_size, 100 * 1024 * 1024);
}

#[test]
fn test_open_creates_file_and_appends() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let sink = RotatingFileSink::open(&path, policy(1024)).unwrap();
    assert!(path.exists());

    sink.append(b"first\n").unwrap();
    sink.append(b"second\n").unwrap();
    // every append is flushed
    assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    sink.close().unwrap();
}

#[test]
fn test_open_in_missing_directory_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing").join("app.log");
    assert!(RotatingFileSink::open(&path, policy(1024)).is_err());
}

#[test]
fn test_reopen_keeps_existing_content() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    fs::write(&path, b"old\n").unwrap();

    let sink = RotatingFileSink::open(&path, policy(1024)).unwrap();
    sink.append(b"new\n").unwrap();
    sink.close().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "old\nnew\n");
}

#[test]
fn test_write_past_max_size_rotates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let sink = RotatingFileSink::open(&path, policy(64)).unwrap();

    let line = [b'a'; 40];
    for _ in 0..3 {
        sink.append(&line).unwrap();
    }
    sink.close().unwrap();

    // records are never split: the file grows past the limit once, then rolls
    assert_eq!(fs::read(backup(&path, 1)).unwrap().len(), 80);
    assert_eq!(fs::read(&path).unwrap().len(), 40);
    assert!(!backup(&path, 2).exists());
}

#[test]
fn test_write_trait_appends() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let sink = RotatingFileSink::open(&path, policy(1024)).unwrap();
    writeln!(&sink, "via {}", "write").unwrap();
    (&sink).flush().unwrap();
    sink.close().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "via write\n");
}

#[test]
fn test_max_backups_prunes_oldest() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let sink = RotatingFileSink::open(
        &path,
        RotationPolicy {
            max_backups: 2,
            ..policy(1024)
        },
    )
    .unwrap();

    for round in 0..4 {
        sink.append(format!("round {round}\n").as_bytes()).unwrap();
        sink.rotate().unwrap();
    }
    sink.close().unwrap();

    assert_eq!(fs::read_to_string(backup(&path, 1)).unwrap(), "round 3\n");
    assert_eq!(fs::read_to_string(backup(&path, 2)).unwrap(), "round 2\n");
    assert!(!backup(&path, 3).exists());
}

#[test]
fn test_back_to_back_rotations_keep_every_record() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let sink = RotatingFileSink::open(&path, policy(1024)).unwrap();

    for round in 0..20 {
        sink.append(format!("round {round}\n").as_bytes()).unwrap();
        sink.rotate().unwrap();
    }
    sink.close().unwrap();

    let mut lines: Vec<String> = (1..=20)
        .map(|index| fs::read_to_string(backup(&path, index)).unwrap())
        .collect();
    assert_eq!(lines.first().map(String::as_str), Some("round 19\n"));
    lines.sort();
    lines.dedup();
    assert_eq!(lines.len(), 20);
}

#[test]
fn test_compress_backups() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let sink = RotatingFileSink::open(
        &path,
        RotationPolicy {
            compress: true,
            ..policy(1024)
        },
    )
    .unwrap();

    sink.append(b"compress me\n").unwrap();
    sink.rotate().unwrap();
    sink.close().unwrap();

    let compressed = PathBuf::from(format!("{}.1.gz", path.display()));
    assert!(!backup(&path, 1).exists());
    let mut decoded = String::new();
    GzDecoder::new(fs::File::open(&compressed).unwrap())
        .read_to_string(&mut decoded)
        .unwrap();
    assert_eq!(decoded, "compress me\n");
}

#[test]
fn test_max_age_prunes_on_open() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let keep_a_day = RotationPolicy {
        max_age_days: 1,
        ..policy(1024)
    };

    let sink = RotatingFileSink::open(&path, keep_a_day).unwrap();
    sink.append(b"stale\n").unwrap();
    sink.rotate().unwrap();
    sink.append(b"fresh\n").unwrap();
    sink.rotate().unwrap();
    sink.close().unwrap();

    let stale = backup(&path, 2);
    let month_ago = SystemTime::now() - Duration::from_secs(30 * 86_400);
    fs::File::options()
        .write(true)
        .open(&stale)
        .unwrap()
        .set_modified(month_ago)
        .unwrap();

    let sink = RotatingFileSink::open(&path, keep_a_day).unwrap();
    assert!(!stale.exists());
    assert_eq!(fs::read_to_string(backup(&path, 1)).unwrap(), "fresh\n");

    // the rotator keeps working after the pruned backups are gone
    sink.append(b"later\n").unwrap();
    sink.rotate().unwrap();
    sink.close().unwrap();
    assert_eq!(fs::read_to_string(backup(&path, 1)).unwrap(), "later\n");
    assert_eq!(fs::read_to_string(backup(&path, 2)).unwrap(), "fresh\n");
}

#[test]
fn test_zero_max_age_keeps_old_backups() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let sink = RotatingFileSink::open(&path, policy(1024)).unwrap();
    sink.append(b"old\n").unwrap();
    sink.rotate().unwrap();
    sink.close().unwrap();

    let old = backup(&path, 1);
    fs::File::options()
        .write(true)
        .open(&old)
        .unwrap()
        .set_modified(SystemTime::UNIX_EPOCH)
        .unwrap();

    RotatingFileSink::open(&path, policy(1024)).unwrap().close().unwrap();
    assert!(old.exists());
}

#[test]
fn test_shared_reuses_open_sink() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shared.log");

    let first = RotatingFileSink::shared(&path, policy(1024)).unwrap();
    let second = RotatingFileSink::shared(&path, policy(2048)).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.policy().max_size, 1024);

    first.append(b"one\n").unwrap();
    second.append(b"two\n").unwrap();
    first.close().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");

    let reopened = RotatingFileSink::shared(&path, policy(1024)).unwrap();
    assert!(!Arc::ptr_eq(&first, &reopened));
    assert!(!reopened.is_closed());
    reopened.close().unwrap();
}

#[test]
fn test_shared_after_last_handle_dropped_opens_new_sink() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dropped.log");

    let sink = RotatingFileSink::shared(&path, policy(1024)).unwrap();
    sink.append(b"before\n").unwrap();
    drop(sink);

    let sink = RotatingFileSink::shared(&path, policy(1024)).unwrap();
    sink.append(b"after\n").unwrap();
    sink.close().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "before\nafter\n");
}

#[test]
fn test_rotate_then_append_keeps_writing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let sink = RotatingFileSink::open(&path, policy(1024)).unwrap();
    for round in 0..3 {
        sink.rotate().unwrap();
        sink.append(format!("after rotation {round}\n").as_bytes())
            .unwrap();
        assert!(!sink.is_closed());
    }
    sink.close().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "after rotation 2\n");
}

#[test]
fn test_close_is_idempotent() {
    let dir = tempdir().unwrap();
    let sink = RotatingFileSink::open(dir.path().join("app.log"), policy(1024)).unwrap();
    assert!(!sink.is_closed());
    for _ in 0..5 {
        sink.close().unwrap();
    }
    assert!(sink.is_closed());
}

#[test]
fn test_close_never_called_is_fine() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    {
        let sink = RotatingFileSink::open(&path, policy(1024)).unwrap();
        sink.append(b"dropped without close\n").unwrap();
    }
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "dropped without close\n"
    );
}

#[test]
fn test_concurrent_close() {
    let dir = tempdir().unwrap();
    let sink = Arc::new(RotatingFileSink::open(dir.path().join("app.log"), policy(1024)).unwrap());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let sink = Arc::clone(&sink);
            thread::spawn(move || sink.close())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }
    assert!(sink.is_closed());
}

#[test]
fn test_writes_after_close_fail() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let sink = RotatingFileSink::open(&path, policy(1024)).unwrap();
    sink.append(b"kept\n").unwrap();
    sink.close().unwrap();

    let err = sink.append(b"lost\n").unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    assert!(sink.rotate().is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), "kept\n");
}

#[test]
fn test_concurrent_appends_keep_lines_whole() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let sink = Arc::new(RotatingFileSink::open(&path, policy(1024 * 1024)).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let sink = Arc::clone(&sink);
            thread::spawn(move || {
                for line in 0..50 {
                    sink.append(format!("worker {worker} line {line}\n").as_bytes())
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    sink.close().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 200);
    assert!(content.lines().all(|line| line.starts_with("worker ")));
}
