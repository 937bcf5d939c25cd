//! Redaction policy configuration.
//!
//! Defines which parameter, header, and response names are hidden and the
//! placeholder written in their place.

use crate::{FieldClass, NameMatching};
use serde::Serialize;
use std::collections::BTreeSet;

/// Value written in place of a hidden field.
pub const DEFAULT_PLACEHOLDER: &str = "********";

/// Redaction policy.
///
/// Built from the `redaction` section of the configuration file, which is
/// the only place a policy is loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedactionPolicy {
    /// Request parameter names (exact, dotted paths allowed).
    pub hidden_parameters: BTreeSet<String>,

    /// Request header names (case-insensitive).
    pub hidden_headers: BTreeSet<String>,

    /// Response body keys (exact, dotted paths allowed).
    pub hidden_response_parameters: BTreeSet<String>,

    /// Replacement value for hidden fields.
    pub placeholder: String,
}

fn default_hidden_parameters() -> BTreeSet<String> {
    ["_token", "password", "password_confirmation"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_hidden_headers() -> BTreeSet<String> {
    ["cookie", "x-csrf-token", "x-xsrf-token", "authorization"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}

impl RedactionPolicy {
    /// Create a new policy with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// A policy that hides nothing.
    pub fn empty() -> Self {
        Self {
            hidden_parameters: BTreeSet::new(),
            hidden_headers: BTreeSet::new(),
            hidden_response_parameters: BTreeSet::new(),
            placeholder: default_placeholder(),
        }
    }

    /// Add request parameter names to hide.
    pub fn hide_parameters<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden_parameters.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add request header names to hide.
    pub fn hide_headers<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden_headers.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add response body keys to hide.
    pub fn hide_response_parameters<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden_response_parameters
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Configured names for a field class.
    pub fn names_for(&self, class: FieldClass) -> &BTreeSet<String> {
        match class {
            FieldClass::Parameter => &self.hidden_parameters,
            FieldClass::Header => &self.hidden_headers,
            FieldClass::ResponseParameter => &self.hidden_response_parameters,
        }
    }

    /// Whether a top-level key of the given class is hidden.
    ///
    /// Dotted parameter paths are resolved by the redactor, not here.
    pub fn is_hidden(&self, class: FieldClass, key: &str) -> bool {
        let names = self.names_for(class);
        match class.matching() {
            NameMatching::ExactPath => names.contains(key),
            NameMatching::CaseInsensitive => names.iter().any(|n| n.eq_ignore_ascii_case(key)),
        }
    }

    /// Whether the policy hides anything at all.
    pub fn is_empty(&self) -> bool {
        FieldClass::ALL
            .iter()
            .all(|class| self.names_for(*class).is_empty())
    }
}

impl Default for RedactionPolicy {
    fn default() -> Self {
        Self {
            hidden_parameters: default_hidden_parameters(),
            hidden_headers: default_hidden_headers(),
            hidden_response_parameters: BTreeSet::new(),
            placeholder: default_placeholder(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RedactionPolicy::default();
        assert_eq!(policy.placeholder, "********");
        assert_eq!(policy.hidden_parameters.len(), 3);
        assert!(policy.hidden_parameters.contains("_token"));
        assert!(policy.hidden_parameters.contains("password_confirmation"));
        assert_eq!(policy.hidden_headers.len(), 4);
        assert!(policy.hidden_headers.contains("x-xsrf-token"));
        assert!(policy.hidden_response_parameters.is_empty());
    }

    #[test]
    fn test_is_hidden_matching_rules() {
        let policy = RedactionPolicy::default();

        assert!(policy.is_hidden(FieldClass::Header, "Authorization"));
        assert!(policy.is_hidden(FieldClass::Header, "COOKIE"));
        assert!(!policy.is_hidden(FieldClass::Header, "X-Custom"));

        assert!(policy.is_hidden(FieldClass::Parameter, "password"));
        assert!(!policy.is_hidden(FieldClass::Parameter, "Password"));
    }

    #[test]
    fn test_hide_extends() {
        let mut policy = RedactionPolicy::default();
        policy
            .hide_parameters(["api_key"])
            .hide_headers(["x-api-key"])
            .hide_response_parameters(["token"]);

        assert!(policy.is_hidden(FieldClass::Parameter, "api_key"));
        assert!(policy.is_hidden(FieldClass::Parameter, "password"));
        assert!(policy.is_hidden(FieldClass::Header, "X-Api-Key"));
        assert!(policy.is_hidden(FieldClass::ResponseParameter, "token"));
    }

    #[test]
    fn test_empty_policy() {
        assert!(RedactionPolicy::empty().is_empty());
        assert!(!RedactionPolicy::default().is_empty());
    }
}
