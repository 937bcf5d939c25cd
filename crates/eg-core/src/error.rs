//! Errors raised at the pipeline's edges.
//!
//! Filtering and redaction are total; only reading entries in and writing
//! them out can fail.

use thiserror::Error;

/// Errors from entry sources and sinks.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A line of input is not a valid entry.
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: eg_common::Error,
    },
}

impl PipelineError {
    /// Whether the error is confined to one input record.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PipelineError::Parse { .. })
    }
}
