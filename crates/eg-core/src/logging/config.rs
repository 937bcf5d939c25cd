//! Logging configuration.
//!
//! Level and format come from `ENTRYGATE_LOG` (or `RUST_LOG`) and
//! `ENTRYGATE_LOG_FORMAT`; `--log-level` and `--log-format` override both.

use clap::ValueEnum;

/// Environment variable holding the log level.
pub const ENV_LOG: &str = "ENTRYGATE_LOG";

/// Environment variable holding the log format.
pub const ENV_LOG_FORMAT: &str = "ENTRYGATE_LOG_FORMAT";

/// Log output format on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    #[value(alias = "console")]
    Human,
    /// One JSON object per event, for log shippers.
    #[value(alias = "json")]
    Jsonl,
}

/// Minimum level of events written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    #[value(alias = "warning")]
    Warn,
    Error,
    #[value(alias = "quiet")]
    Off,
}

impl LogLevel {
    /// Directive spelling understood by `EnvFilter`.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }

    /// Coarse level implied by a `RUST_LOG` directive string.
    fn from_rust_log(directives: &str) -> Option<Self> {
        [LogLevel::Trace, LogLevel::Debug, LogLevel::Info, LogLevel::Error]
            .into_iter()
            .find(|level| directives.contains(level.as_str()))
    }
}

/// Resolved logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
}

impl LogConfig {
    /// Read the process environment, then apply CLI overrides.
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), cli_level, cli_format)
    }

    /// Same as [`LogConfig::from_env`], reading variables through `lookup`.
    /// Unparseable values are ignored.
    pub fn from_lookup<F>(lookup: F, cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_level = match lookup(ENV_LOG) {
            Some(val) => LogLevel::from_str(val.trim(), true).ok(),
            None => lookup("RUST_LOG").and_then(|val| LogLevel::from_rust_log(&val)),
        };
        let env_format =
            lookup(ENV_LOG_FORMAT).and_then(|val| LogFormat::from_str(val.trim(), true).ok());

        LogConfig {
            format: cli_format.or(env_format).unwrap_or_default(),
            level: cli_level.or(env_level).unwrap_or_default(),
        }
    }
}
