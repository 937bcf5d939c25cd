//! Entrygate configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for `entrygate.json`
//! - Config resolution (CLI → env → XDG → system → defaults)
//! - Environment resolution (CLI → `ENTRYGATE_ENV` → `APP_ENV` → file → production)
//! - Semantic validation
//! - Resolved settings handed to the pipeline at startup

pub mod file;
pub mod resolve;
pub mod settings;
pub mod validate;

pub use file::{ConfigFile, RedactionSection};
pub use resolve::{resolve_config_path, resolve_environment, ConfigSource, EnvironmentSource};
pub use settings::Settings;
pub use validate::{ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
