//! Entry redactor.
//!
//! The [`Redactor`] applies a [`RedactionPolicy`] to entries. It holds no
//! mutable state and may be shared across threads.

use crate::{FieldClass, NameMatching, RedactionPolicy};
use eg_common::{Entry, Environment};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields masked while redacting one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionReport {
    /// Dotted paths of masked fields, e.g. `headers.authorization`.
    pub masked: Vec<String>,
}

impl RedactionReport {
    pub fn is_empty(&self) -> bool {
        self.masked.is_empty()
    }

    pub fn len(&self) -> usize {
        self.masked.len()
    }

    fn record(&mut self, path: String) {
        self.masked.push(path);
    }
}

/// Applies a redaction policy to entries outside the local environment.
#[derive(Debug, Clone)]
pub struct Redactor {
    environment: Environment,
    policy: RedactionPolicy,
}

impl Redactor {
    pub fn new(environment: Environment, policy: RedactionPolicy) -> Self {
        Self {
            environment,
            policy,
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn policy(&self) -> &RedactionPolicy {
        &self.policy
    }

    /// Whether redaction applies at all. Local entries are never touched.
    pub fn is_active(&self) -> bool {
        !self.environment.is_local()
    }

    /// Return a redacted copy of `entry`.
    pub fn redact(&self, entry: &Entry) -> Entry {
        self.apply(entry.clone()).0
    }

    /// Redact an owned entry, reporting which fields were masked.
    pub fn apply(&self, entry: Entry) -> (Entry, RedactionReport) {
        if !self.is_active() {
            return (entry, RedactionReport::default());
        }
        let (entry, report) = scrub(entry, &self.policy);
        if !report.is_empty() {
            tracing::trace!(
                uuid = %entry.uuid,
                entry_type = %entry.entry_type,
                masked = report.len(),
                "entry redacted"
            );
        }
        (entry, report)
    }
}

/// Redact `entry` for `env` under `policy`.
///
/// Returns the entry unchanged in the local environment.
pub fn redact(entry: &Entry, env: &Environment, policy: &RedactionPolicy) -> Entry {
    if env.is_local() {
        return entry.clone();
    }
    scrub(entry.clone(), policy).0
}

fn scrub(mut entry: Entry, policy: &RedactionPolicy) -> (Entry, RedactionReport) {
    let mut report = RedactionReport::default();
    let placeholder = policy.placeholder.as_str();

    for class in FieldClass::ALL {
        let names = policy.names_for(class);
        if names.is_empty() {
            continue;
        }
        for section_key in class.content_keys() {
            let Some(Value::Object(section)) = entry.content.get_mut(*section_key) else {
                continue;
            };
            match class.matching() {
                NameMatching::ExactPath => {
                    for name in names {
                        mask_in_object(section, name, placeholder, section_key, &mut report);
                    }
                }
                NameMatching::CaseInsensitive => {
                    for (key, value) in section.iter_mut() {
                        if policy.is_hidden(class, key) {
                            let path = format!("{}.{}", section_key, key);
                            mask_value(value, placeholder, path, &mut report);
                        }
                    }
                }
            }
        }
    }

    (entry, report)
}

/// Mask `path` inside `map`. A literal key wins over a dotted traversal.
fn mask_in_object(
    map: &mut Map<String, Value>,
    path: &str,
    placeholder: &str,
    trail: &str,
    report: &mut RedactionReport,
) {
    if let Some(value) = map.get_mut(path) {
        mask_value(value, placeholder, format!("{}.{}", trail, path), report);
        return;
    }
    if let Some((head, rest)) = path.split_once('.') {
        if let Some(child) = map.get_mut(head) {
            let trail = format!("{}.{}", trail, head);
            mask_in_value(child, rest, placeholder, &trail, report);
        }
    }
}

fn mask_in_value(
    value: &mut Value,
    path: &str,
    placeholder: &str,
    trail: &str,
    report: &mut RedactionReport,
) {
    match value {
        Value::Object(map) => mask_in_object(map, path, placeholder, trail, report),
        Value::Array(items) => {
            let (head, rest) = match path.split_once('.') {
                Some((head, rest)) => (head, Some(rest)),
                None => (path, None),
            };
            let Some(item) = head.parse::<usize>().ok().and_then(|i| items.get_mut(i)) else {
                return;
            };
            let trail = format!("{}.{}", trail, head);
            match rest {
                Some(rest) => mask_in_value(item, rest, placeholder, &trail, report),
                None => mask_value(item, placeholder, trail, report),
            }
        }
        _ => {}
    }
}

fn mask_value(value: &mut Value, placeholder: &str, path: String, report: &mut RedactionReport) {
    if value.as_str() == Some(placeholder) {
        return;
    }
    *value = Value::String(placeholder.to_string());
    report.record(path);
}
