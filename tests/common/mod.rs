//! Common test utilities

use serde_json::Value;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[allow(dead_code)] // Test utility for integration tests
static GLOBAL_LOGGER: Mutex<()> = Mutex::new(());

/// Serializes tests that install the process-wide logger
#[allow(dead_code)] // Test utility for integration tests
pub fn lock_global_logger() -> MutexGuard<'static, ()> {
    GLOBAL_LOGGER.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory writer; clones share one buffer
#[allow(dead_code)] // Test utility for integration tests
#[derive(Clone, Default)]
pub struct SharedBuffer {
    buffer: Arc<Mutex<Vec<u8>>>,
}

#[allow(dead_code)] // Test utility for integration tests
impl SharedBuffer {
    pub fn records(&self) -> Vec<Value> {
        let bytes = self.buffer.lock().unwrap().clone();
        String::from_utf8(bytes)
            .expect("records should be UTF-8")
            .lines()
            .map(|line| serde_json::from_str(line).expect("record should be valid JSON"))
            .collect()
    }

    /// Messages of every record, in write order
    pub fn messages(&self) -> Vec<String> {
        self.records()
            .iter()
            .filter_map(|record| record["msg"].as_str().map(str::to_string))
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Parses a JSON-lines log file
#[allow(dead_code)] // Test utility for integration tests
pub fn read_records(path: &std::path::Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .expect("log file should exist")
        .lines()
        .map(|line| serde_json::from_str(line).expect("record should be valid JSON"))
        .collect()
}
