use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use crate::sink::RotatingFileSink;

type SharedStream = Arc<Mutex<Box<dyn Write + Send>>>;

/// The destination a handler writes serialized records to.
#[derive(Clone)]
pub enum SinkWriter {
    Stdout,
    Stderr,
    Stream(SharedStream),
    File(Arc<RotatingFileSink>),
}

impl std::fmt::Debug for SinkWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => f.write_str("Stdout"),
            Self::Stderr => f.write_str("Stderr"),
            Self::Stream(_) => f.write_str("Stream"),
            Self::File(sink) => f.debug_tuple("File").field(&sink.path()).finish(),
        }
    }
}

impl SinkWriter {
    pub fn stream<W: Write + Send + 'static>(writer: W) -> Self {
        Self::Stream(Arc::new(Mutex::new(Box::new(writer))))
    }

    #[must_use]
    pub fn file_sink(&self) -> Option<&Arc<RotatingFileSink>> {
        match self {
            Self::File(sink) => Some(sink),
            Self::Stdout | Self::Stderr | Self::Stream(_) => None,
        }
    }

    /// Short name used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
            Self::Stream(_) => "stream",
            Self::File(_) => "file",
        }
    }

    /// Writes one complete record and flushes it.
    ///
    /// Records sent to a closed file sink are dropped.
    pub(crate) fn write_record(&self, record: &[u8]) -> io::Result<()> {
        match self {
            Self::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(record)?;
                out.flush()
            }
            Self::Stderr => {
                let mut out = io::stderr().lock();
                out.write_all(record)?;
                out.flush()
            }
            Self::Stream(stream) => {
                let mut stream = stream.lock().unwrap_or_else(PoisonError::into_inner);
                stream.write_all(record)?;
                stream.flush()
            }
            Self::File(sink) => {
                if sink.is_closed() {
                    return Ok(());
                }
                sink.append(record).map(drop)
            }
        }
    }

    pub(crate) fn flush(&self) -> io::Result<()> {
        match self {
            Self::Stdout => io::stdout().flush(),
            Self::Stderr => io::stderr().flush(),
            Self::Stream(stream) => stream
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .flush(),
            Self::File(sink) => sink.as_ref().flush(),
        }
    }
}
