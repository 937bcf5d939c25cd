//! Entrygate common types and errors.
//!
//! This crate provides the data model shared by the redactor, the admission
//! filter, and the pipeline:
//! - Telemetry entries and their type tags
//! - Derived entry predicates (failed request, failed job, ...)
//! - Deployment environments
//! - Common error types

pub mod entry;
pub mod environment;
pub mod error;

pub use entry::{Entry, EntryType, MonitoredTags};
pub use environment::Environment;
pub use error::{Error, Result};

/// Schema version for serialized entries and configuration.
pub const SCHEMA_VERSION: &str = "1.0.0";
