//! Append-only JSONL event recording.
//!
//! The first line of a recording is a run header carrying a fresh run
//! ID; every following line is one event.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use uuid::Uuid;

use aether_events::Event;

/// Writes published events to a JSONL file.
pub struct EventRecorder {
    writer: Option<BufWriter<File>>,
    recorded: u64,
}

impl EventRecorder {
    /// Creates a recorder writing to the specified path. Truncates any
    /// existing file and writes the run header.
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        let mut writer = BufWriter::new(file);

        let header = serde_json::json!({
            "run_id": Uuid::new_v4().to_string(),
            "format": "aethermoor-events",
        });
        writeln!(writer, "{}", header)?;

        Ok(Self {
            writer: Some(writer),
            recorded: 0,
        })
    }

    /// Creates a recorder that discards events (for testing).
    pub fn null() -> Self {
        Self {
            writer: None,
            recorded: 0,
        }
    }

    /// Number of events recorded so far.
    pub fn recorded(&self) -> u64 {
        self.recorded
    }

    /// Records one event as a JSONL line.
    pub fn record(&mut self, event: &Event) -> std::io::Result<()> {
        self.recorded += 1;
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(event)?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    /// Flushes buffered lines to disk.
    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for EventRecorder {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            eprintln!("Warning: Failed to flush event recorder: {}", e);
        }
    }
}
