//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI arguments → environment variables → XDG paths → defaults.

use eg_common::Environment;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/entrygate/.
    SystemConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Where the deployment environment came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentSource {
    CliArgument,
    /// `ENTRYGATE_ENV`.
    EntrygateEnv,
    /// `APP_ENV`.
    AppEnv,
    ConfigFile,
    #[default]
    BuiltinDefault,
}

/// Environment variable names.
pub const ENV_CONFIG_PATH: &str = "ENTRYGATE_CONFIG";
pub const ENV_CONFIG_DIR: &str = "ENTRYGATE_CONFIG_DIR";
pub const ENV_ENVIRONMENT: &str = "ENTRYGATE_ENV";
pub const ENV_APP_ENV: &str = "APP_ENV";

/// Standard config file name.
pub const CONFIG_FILENAME: &str = "entrygate.json";

/// Application name for XDG directories.
const APP_NAME: &str = "entrygate";

/// Resolve the configuration file path.
///
/// Resolution order:
/// 1. Explicit CLI path (returned even if missing, so loading reports it)
/// 2. `ENTRYGATE_CONFIG` environment variable
/// 3. `ENTRYGATE_CONFIG_DIR` + `entrygate.json`
/// 4. XDG config directory (`~/.config/entrygate/`)
/// 5. System config (`/etc/entrygate/`)
/// 6. Built-in defaults (None)
pub fn resolve_config_path(cli_path: Option<&Path>) -> (Option<PathBuf>, ConfigSource) {
    if let Some(path) = cli_path {
        return (Some(path.to_path_buf()), ConfigSource::CliArgument);
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return (Some(path), ConfigSource::Environment);
        }
    }

    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(CONFIG_FILENAME);
        if path.exists() {
            return (Some(path), ConfigSource::Environment);
        }
    }

    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(CONFIG_FILENAME);
        if path.exists() {
            return (Some(path), ConfigSource::XdgConfig);
        }
    }

    let system_path = system_config_dir().join(CONFIG_FILENAME);
    if system_path.exists() {
        return (Some(system_path), ConfigSource::SystemConfig);
    }

    (None, ConfigSource::BuiltinDefault)
}

/// Resolve the deployment environment.
///
/// Resolution order: CLI → `ENTRYGATE_ENV` → `APP_ENV` → config file →
/// production. Blank values are skipped.
pub fn resolve_environment(
    cli_env: Option<&str>,
    file_env: Option<&str>,
) -> (Environment, EnvironmentSource) {
    if let Some(name) = non_blank(cli_env) {
        return (Environment::parse_str(name), EnvironmentSource::CliArgument);
    }
    if let Ok(name) = std::env::var(ENV_ENVIRONMENT) {
        if let Some(name) = non_blank(Some(&name)) {
            return (Environment::parse_str(name), EnvironmentSource::EntrygateEnv);
        }
    }
    if let Ok(name) = std::env::var(ENV_APP_ENV) {
        if let Some(name) = non_blank(Some(&name)) {
            return (Environment::parse_str(name), EnvironmentSource::AppEnv);
        }
    }
    if let Some(name) = non_blank(file_env) {
        return (Environment::parse_str(name), EnvironmentSource::ConfigFile);
    }
    (Environment::default(), EnvironmentSource::BuiltinDefault)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Get the XDG config directory for entrygate.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}
