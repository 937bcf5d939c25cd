//! Destinations for retained entries.

use crate::PipelineError;
use eg_common::Entry;
use std::io::Write;

/// Consumer of retained, redacted entries.
pub trait Sink {
    /// Accept one entry.
    fn accept(&mut self, entry: Entry) -> Result<(), PipelineError>;

    /// Flush buffered output.
    fn flush(&mut self) -> Result<(), PipelineError> {
        Ok(())
    }
}

/// Writes one JSON entry per line.
pub struct JsonlSink<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of entries written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for JsonlSink<W> {
    fn accept(&mut self, entry: Entry) -> Result<(), PipelineError> {
        serde_json::to_writer(&mut self.writer, &entry)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), PipelineError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Collects entries in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Vec<Entry>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}

impl Sink for MemorySink {
    fn accept(&mut self, entry: Entry) -> Result<(), PipelineError> {
        self.entries.push(entry);
        Ok(())
    }
}
