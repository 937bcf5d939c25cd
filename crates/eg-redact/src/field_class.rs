//! Classification of the entry sections that carry sensitive data.

use serde::{Deserialize, Serialize};

/// A class of sensitive fields inside an entry's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldClass {
    /// Request parameters (query string and body).
    Parameter,
    /// Request headers.
    Header,
    /// Keys of a structured response body.
    ResponseParameter,
}

/// How a configured name is compared with a key found in the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatching {
    /// Byte-for-byte equality; dotted names address nested objects.
    ExactPath,
    /// ASCII case-insensitive equality on top-level keys.
    CaseInsensitive,
}

impl FieldClass {
    /// All field classes, in redaction order.
    pub const ALL: [FieldClass; 3] = [
        FieldClass::Parameter,
        FieldClass::Header,
        FieldClass::ResponseParameter,
    ];

    /// Content keys holding the section for this class.
    ///
    /// `payload` is the name request watchers commonly use for the parsed
    /// request body, so it is scrubbed alongside `parameters`.
    pub fn content_keys(&self) -> &'static [&'static str] {
        match self {
            FieldClass::Parameter => &["parameters", "payload"],
            FieldClass::Header => &["headers"],
            FieldClass::ResponseParameter => &["response"],
        }
    }

    pub fn matching(&self) -> NameMatching {
        match self {
            FieldClass::Parameter | FieldClass::ResponseParameter => NameMatching::ExactPath,
            FieldClass::Header => NameMatching::CaseInsensitive,
        }
    }
}

impl std::fmt::Display for FieldClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FieldClass::Parameter => "parameter",
            FieldClass::Header => "header",
            FieldClass::ResponseParameter => "response_parameter",
        };
        write!(f, "{}", s)
    }
}
