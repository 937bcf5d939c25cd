//! JSONL entry source.

use crate::PipelineError;
use eg_common::Entry;
use std::io::{BufRead, ErrorKind};

/// Reads one entry per line. Blank lines are skipped.
///
/// A malformed line, including one that is not UTF-8, yields
/// [`PipelineError::Parse`] and reading continues with the next line.
pub struct JsonlSource<R: BufRead> {
    reader: R,
    line: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> JsonlSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for JsonlSource<R> {
    type Item = Result<Entry, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line += 1;
                    let line = self.line;
                    let text = match std::str::from_utf8(&self.buf) {
                        Ok(text) => text.trim(),
                        Err(e) => {
                            return Some(Err(PipelineError::Parse {
                                line,
                                source: e.into(),
                            }))
                        }
                    };
                    if text.is_empty() {
                        continue;
                    }
                    return Some(
                        Entry::from_json_str(text)
                            .map_err(|source| PipelineError::Parse { line, source }),
                    );
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Some(Err(PipelineError::Io(e))),
            }
        }
    }
}
