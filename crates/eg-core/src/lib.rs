//! Entrygate Core Library
//!
//! This library provides the retention side of the entry pipeline:
//! - Admission filter deciding which entries are kept
//! - Pipeline composing redaction and admission
//! - JSONL entry sources and sinks
//! - Exit codes and structured logging for the CLI
//!
//! The binary entry point is in `main.rs`.

pub mod error;
pub mod exit_codes;
pub mod filter;
pub mod logging;
pub mod pipeline;
pub mod sink;
pub mod source;

pub use error::PipelineError;
pub use filter::{should_keep, Admission, AdmissionFilter, DropReason, KeepReason};
pub use pipeline::{Outcome, Pipeline, PipelineStats};
pub use sink::{JsonlSink, MemorySink, Sink};
pub use source::JsonlSource;
