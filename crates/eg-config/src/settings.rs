//! Resolved startup settings.
//!
//! [`Settings`] is built once at process start and then handed, read-only,
//! to the redactor and the admission filter.

use crate::file::ConfigFile;
use crate::resolve::{resolve_config_path, resolve_environment, ConfigSource, EnvironmentSource};
use crate::validate::{validate_file, validate_policy, ValidationResult};
use eg_common::{Environment, MonitoredTags};
use eg_redact::RedactionPolicy;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Fully resolved configuration.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub environment: Environment,
    pub environment_source: EnvironmentSource,
    pub policy: RedactionPolicy,
    pub monitored_tags: MonitoredTags,
    /// Config file that was loaded, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,
    pub config_source: ConfigSource,
}

impl Settings {
    /// Resolve, load, and validate configuration.
    pub fn load(cli_config: Option<&Path>, cli_env: Option<&str>) -> ValidationResult<Self> {
        let (config_path, config_source) = resolve_config_path(cli_config);
        let file = match &config_path {
            Some(path) => ConfigFile::from_file(path)?,
            None => ConfigFile::default(),
        };
        let settings = Self::from_file(&file, cli_env)?;
        tracing::debug!(
            config_source = %config_source,
            environment = %settings.environment,
            "configuration resolved"
        );
        Ok(Self {
            config_path,
            config_source,
            ..settings
        })
    }

    /// Build settings from an already parsed file.
    pub fn from_file(file: &ConfigFile, cli_env: Option<&str>) -> ValidationResult<Self> {
        validate_file(file)?;
        let policy = file.redaction_policy();
        validate_policy(&policy)?;
        let (environment, environment_source) =
            resolve_environment(cli_env, file.environment.as_deref());

        Ok(Self {
            environment,
            environment_source,
            policy,
            monitored_tags: file.monitored_tags(),
            config_path: None,
            config_source: ConfigSource::BuiltinDefault,
        })
    }
}
