//! Chat log sink
//!
//! Append-only text file of server status lines and public chat. Each
//! append writes and flushes under one lock so concurrent writers never
//! interleave.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

/// Shared handle to the chat log file
#[derive(Debug, Clone)]
pub struct ChatLog {
    file: Arc<Mutex<File>>,
}

impl ChatLog {
    /// Open (or create) the log file in append mode
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self {
            file: Arc::new(Mutex::new(file)),
        })
    }

    /// Append one line and flush
    ///
    /// Write failures are reported through tracing and otherwise ignored.
    pub fn append(&self, line: &str) {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(file, "{}", line).and_then(|_| file.flush()) {
            warn!("Failed to write chat log: {}", e);
        }
    }

    /// Flush and sync to disk
    pub fn flush(&self) {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = file.flush().and_then(|_| file.sync_all()) {
            warn!("Failed to flush chat log: {}", e);
        }
    }
}
