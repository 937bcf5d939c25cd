//! Deployment environment.

use serde::{Deserialize, Serialize};

/// Deployment context a collector runs in.
///
/// Resolved once at startup and passed by value afterwards. Only
/// [`Environment::Local`] is trusted: it disables redaction and admits every
/// entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Environment {
    /// Developer machine; data never leaves it.
    Local,
    /// Automated test runs.
    Testing,
    /// Pre-production.
    Staging,
    /// Production.
    Production,
    /// Any other named environment, treated as untrusted.
    Other(String),
}

impl Environment {
    /// Parse an environment name. Never fails: unknown names map to `Other`.
    pub fn parse_str(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "local" | "dev" | "development" => Environment::Local,
            "test" | "testing" => Environment::Testing,
            "stage" | "staging" => Environment::Staging,
            "prod" | "production" => Environment::Production,
            _ => Environment::Other(trimmed.to_string()),
        }
    }

    /// Whether this is the trusted local environment.
    pub fn is_local(&self) -> bool {
        matches!(self, Environment::Local)
    }

    /// Canonical name.
    pub fn as_str(&self) -> &str {
        match self {
            Environment::Local => "local",
            Environment::Testing => "testing",
            Environment::Staging => "staging",
            Environment::Production => "production",
            Environment::Other(name) => name,
        }
    }
}

impl Default for Environment {
    // Untrusted unless told otherwise.
    fn default() -> Self {
        Environment::Production
    }
}

impl std::str::FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Environment::parse_str(s))
    }
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        Environment::parse_str(&s)
    }
}

impl From<Environment> for String {
    fn from(env: Environment) -> Self {
        env.as_str().to_string()
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
