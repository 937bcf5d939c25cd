//! Structured logging for the entrygate CLI.
//!
//! Provides dual-mode logging:
//! - Human-readable console output for interactive use
//! - Machine-parseable JSONL for log shippers
//!
//! stdout is reserved for retained entries; all log output goes to stderr.
//! Log events carry entry uuids and types, never entry content.

pub mod config;

pub use config::{LogConfig, LogFormat, LogLevel};

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose events are shown by default.
const LOG_TARGETS: &[&str] = &["entrygate", "eg_core", "eg_config", "eg_redact", "eg_common"];

/// Build the default filter directive for `level`.
pub fn filter_directive(level: LogLevel) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level.as_str()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the logging subsystem.
///
/// Should be called once at startup. Returns `false` if a global subscriber
/// was already installed.
pub fn init_logging(config: &LogConfig) -> bool {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if std::env::var(config::ENV_LOG).is_err() => {
            EnvFilter::try_new(directives)
                .unwrap_or_else(|_| EnvFilter::new(filter_directive(config.level)))
        }
        _ => EnvFilter::new(filter_directive(config.level)),
    };

    let result = match config.format {
        LogFormat::Human => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_ansi(std::io::stderr().is_terminal()),
            )
            .try_init(),
        LogFormat::Jsonl => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(false)
                    .flatten_event(true),
            )
            .try_init(),
    };
    result.is_ok()
}
