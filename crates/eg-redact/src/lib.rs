//! Redaction of sensitive request data in telemetry entries.
//!
//! Before an entry leaves the trust boundary, values of sensitive request
//! parameters and headers are replaced with a fixed placeholder. Keys are
//! never removed or added, so downstream consumers still see which fields
//! were sent.
//!
//! # Key Features
//!
//! - **Environment-gated**: in the local environment entries pass through
//!   untouched.
//! - **Field-aware matching**: header names match case-insensitively,
//!   parameter names match exactly and may be dotted paths into nested
//!   payloads (`user.password`).
//! - **Idempotent**: redacting an already redacted entry changes nothing.
//!
//! # Example
//!
//! ```
//! use eg_common::{Entry, EntryType, Environment};
//! use eg_redact::{RedactionPolicy, Redactor};
//! use serde_json::json;
//!
//! let redactor = Redactor::new(Environment::Production, RedactionPolicy::default());
//! let entry = Entry::new(EntryType::Request)
//!     .with_field("headers", json!({"Authorization": "Bearer xyz"}));
//!
//! let redacted = redactor.redact(&entry);
//! assert_eq!(redacted.content["headers"]["Authorization"], "********");
//! ```

pub mod field_class;
pub mod policy;
pub mod redactor;

pub use field_class::{FieldClass, NameMatching};
pub use policy::{RedactionPolicy, DEFAULT_PLACEHOLDER};
pub use redactor::{redact, RedactionReport, Redactor};
