//! The `entrygate.json` configuration file.

use crate::validate::{ValidationError, ValidationResult};
use eg_common::MonitoredTags;
use eg_redact::RedactionPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration file contents. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Environment name, used when neither the CLI nor the process
    /// environment sets one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    #[serde(default)]
    pub redaction: RedactionSection,

    /// Tags whose entries are always retained.
    #[serde(default)]
    pub monitored_tags: Vec<String>,
}

/// Redaction settings. Name lists extend the built-in defaults unless
/// `replace_defaults` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RedactionSection {
    #[serde(default)]
    pub replace_defaults: bool,

    #[serde(default)]
    pub hidden_parameters: Vec<String>,

    #[serde(default)]
    pub hidden_headers: Vec<String>,

    #[serde(default)]
    pub hidden_response_parameters: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            environment: None,
            redaction: RedactionSection::default(),
            monitored_tags: Vec::new(),
        }
    }
}

impl ConfigFile {
    /// Load from a JSON file.
    pub fn from_file(path: &Path) -> ValidationResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ValidationError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    /// Parse from a JSON string.
    pub fn parse(content: &str) -> ValidationResult<Self> {
        serde_json::from_str(content).map_err(|e| ValidationError::ParseError(e.to_string()))
    }

    /// A file spelling out the built-in defaults.
    pub fn defaults() -> Self {
        let policy = RedactionPolicy::default();
        Self {
            redaction: RedactionSection {
                replace_defaults: true,
                hidden_parameters: policy.hidden_parameters.into_iter().collect(),
                hidden_headers: policy.hidden_headers.into_iter().collect(),
                hidden_response_parameters: policy.hidden_response_parameters.into_iter().collect(),
                placeholder: Some(policy.placeholder),
            },
            ..Self::default()
        }
    }

    /// Effective redaction policy.
    pub fn redaction_policy(&self) -> RedactionPolicy {
        let section = &self.redaction;
        let mut policy = if section.replace_defaults {
            RedactionPolicy::empty()
        } else {
            RedactionPolicy::default()
        };
        policy
            .hide_parameters(section.hidden_parameters.iter().cloned())
            .hide_headers(section.hidden_headers.iter().cloned())
            .hide_response_parameters(section.hidden_response_parameters.iter().cloned());
        if let Some(placeholder) = &section.placeholder {
            policy.placeholder = placeholder.clone();
        }
        policy
    }

    pub fn monitored_tags(&self) -> MonitoredTags {
        self.monitored_tags.iter().cloned().collect()
    }
}
