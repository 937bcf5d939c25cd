//! Telemetry entries.
//!
//! An [`Entry`] is one observed event (an HTTP request, a query, a job, an
//! exception, ...). Its `content` is a free-form JSON object whose shape
//! depends on the entry type. The derived predicates below never fail: a
//! missing or mistyped key makes the predicate false.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::{Error, Result};

/// Request URI of the service worker script, dropped in every environment.
pub const SERVICE_WORKER_URI: &str = "sw.js";

/// Type tag of an entry.
///
/// Unrecognized tags are kept as [`EntryType::Unknown`] so that decoding a
/// new upstream watcher never fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntryType {
    Batch,
    Cache,
    ClientRequest,
    Command,
    Dump,
    Event,
    Exception,
    Gate,
    Job,
    Log,
    Mail,
    Model,
    Notification,
    Query,
    Redis,
    Request,
    ScheduledTask,
    View,
    Unknown(String),
}

/// Which derived predicates can ever hold for an entry type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// May be a reportable exception.
    pub exception: bool,
    /// May be a failed inbound HTTP request.
    pub http_request: bool,
    /// May be a failed queued job.
    pub job: bool,
    /// Is a scheduled task run.
    pub scheduled: bool,
}

impl Capabilities {
    const NONE: Capabilities = Capabilities {
        exception: false,
        http_request: false,
        job: false,
        scheduled: false,
    };
}

impl EntryType {
    /// Parse a type tag. `schedule` is accepted as an alias of `scheduled_task`.
    pub fn parse_str(s: &str) -> Self {
        match s {
            "batch" => EntryType::Batch,
            "cache" => EntryType::Cache,
            "client_request" => EntryType::ClientRequest,
            "command" => EntryType::Command,
            "dump" => EntryType::Dump,
            "event" => EntryType::Event,
            "exception" => EntryType::Exception,
            "gate" => EntryType::Gate,
            "job" => EntryType::Job,
            "log" => EntryType::Log,
            "mail" => EntryType::Mail,
            "model" => EntryType::Model,
            "notification" => EntryType::Notification,
            "query" => EntryType::Query,
            "redis" => EntryType::Redis,
            "request" => EntryType::Request,
            "scheduled_task" | "schedule" => EntryType::ScheduledTask,
            "view" => EntryType::View,
            other => EntryType::Unknown(other.to_string()),
        }
    }

    /// Wire name of the type tag.
    pub fn as_str(&self) -> &str {
        match self {
            EntryType::Batch => "batch",
            EntryType::Cache => "cache",
            EntryType::ClientRequest => "client_request",
            EntryType::Command => "command",
            EntryType::Dump => "dump",
            EntryType::Event => "event",
            EntryType::Exception => "exception",
            EntryType::Gate => "gate",
            EntryType::Job => "job",
            EntryType::Log => "log",
            EntryType::Mail => "mail",
            EntryType::Model => "model",
            EntryType::Notification => "notification",
            EntryType::Query => "query",
            EntryType::Redis => "redis",
            EntryType::Request => "request",
            EntryType::ScheduledTask => "scheduled_task",
            EntryType::View => "view",
            EntryType::Unknown(name) => name,
        }
    }

    /// Capability set of this type. Every variant is listed so that adding a
    /// type forces a decision here.
    pub fn capabilities(&self) -> Capabilities {
        match self {
            EntryType::Exception => Capabilities {
                exception: true,
                ..Capabilities::NONE
            },
            EntryType::Request => Capabilities {
                http_request: true,
                ..Capabilities::NONE
            },
            EntryType::Job => Capabilities {
                job: true,
                ..Capabilities::NONE
            },
            EntryType::ScheduledTask => Capabilities {
                scheduled: true,
                ..Capabilities::NONE
            },
            EntryType::Batch
            | EntryType::Cache
            | EntryType::ClientRequest
            | EntryType::Command
            | EntryType::Dump
            | EntryType::Event
            | EntryType::Gate
            | EntryType::Log
            | EntryType::Mail
            | EntryType::Model
            | EntryType::Notification
            | EntryType::Query
            | EntryType::Redis
            | EntryType::View
            | EntryType::Unknown(_) => Capabilities::NONE,
        }
    }
}

impl From<String> for EntryType {
    fn from(s: String) -> Self {
        EntryType::parse_str(&s)
    }
}

impl From<EntryType> for String {
    fn from(t: EntryType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tags the operator is actively monitoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitoredTags(BTreeSet<String>);

impl MonitoredTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        self.0.insert(tag.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for MonitoredTags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        MonitoredTags(iter.into_iter().map(Into::into).collect())
    }
}

/// Top-level keys with a typed counterpart on [`Entry`].
const MODELED_KEYS: [&str; 6] = ["uuid", "batch_id", "type", "content", "tags", "recorded_at"];

/// One observed telemetry event.
///
/// An entry decoded from JSON encodes back to the same document as long as
/// it is not modified: unmodeled top-level fields are carried in `extra`,
/// and the original spelling of the type tag, the timestamp, and empty or
/// absent sections is remembered.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "WireEntry")]
pub struct Entry {
    /// Entry identity, assigned by the collector.
    pub uuid: Uuid,

    /// Groups entries recorded during the same request or job.
    pub batch_id: Option<Uuid>,

    pub entry_type: EntryType,

    /// Type-specific payload (`uri`, `response_status`, `headers`, ...).
    pub content: Map<String, Value>,

    /// Labels attached by upstream instrumentation, in recorded order.
    pub tags: Vec<String>,

    pub recorded_at: Option<DateTime<Utc>>,

    /// Top-level fields this crate does not model (`family_hash`, `user`, ...).
    pub extra: Map<String, Value>,

    wire: WireShape,
}

/// Whether a section was present, `null`, or missing in the decoded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    Present,
    Null,
    Absent,
}

impl Presence {
    fn of<T>(field: &Option<Option<T>>) -> Self {
        match field {
            Some(Some(_)) => Presence::Present,
            Some(None) => Presence::Null,
            None => Presence::Absent,
        }
    }
}

#[derive(Debug, Clone)]
struct WireShape {
    uuid_assigned: bool,
    type_tag: Option<String>,
    recorded_at: Option<String>,
    content: Presence,
    tags: Presence,
}

impl WireShape {
    fn fresh() -> Self {
        Self {
            uuid_assigned: false,
            type_tag: None,
            recorded_at: None,
            content: Presence::Present,
            tags: Presence::Absent,
        }
    }
}

#[derive(Deserialize)]
struct WireEntry {
    #[serde(default)]
    uuid: Option<Uuid>,
    #[serde(default)]
    batch_id: Option<Uuid>,
    #[serde(rename = "type")]
    entry_type: String,
    #[serde(default, deserialize_with = "present")]
    content: Option<Option<Map<String, Value>>>,
    #[serde(default, deserialize_with = "present")]
    tags: Option<Option<Vec<String>>>,
    #[serde(default)]
    recorded_at: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Marks a field that appeared in the document, even as `null`.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn parse_recorded_at(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

impl TryFrom<WireEntry> for Entry {
    type Error = Error;

    fn try_from(wire: WireEntry) -> Result<Self> {
        let recorded_at = match wire.recorded_at.as_deref() {
            Some(raw) => Some(parse_recorded_at(raw).ok_or_else(|| {
                Error::InvalidEntry(format!("`recorded_at` is not an RFC 3339 timestamp: {raw}"))
            })?),
            None => None,
        };
        let entry_type = EntryType::parse_str(&wire.entry_type);
        let shape = WireShape {
            uuid_assigned: wire.uuid.is_none(),
            type_tag: (entry_type.as_str() != wire.entry_type).then_some(wire.entry_type),
            recorded_at: wire.recorded_at,
            content: Presence::of(&wire.content),
            tags: Presence::of(&wire.tags),
        };
        Ok(Self {
            uuid: wire.uuid.unwrap_or_else(Uuid::new_v4),
            batch_id: wire.batch_id,
            entry_type,
            content: wire.content.flatten().unwrap_or_default(),
            tags: wire.tags.flatten().unwrap_or_default(),
            recorded_at,
            extra: wire.extra,
            wire: shape,
        })
    }
}

/// Equality over the entry's data; how it was spelled on the wire is ignored.
impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
            && self.batch_id == other.batch_id
            && self.entry_type == other.entry_type
            && self.content == other.content
            && self.tags == other.tags
            && self.recorded_at == other.recorded_at
            && self.extra == other.extra
    }
}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if !self.wire.uuid_assigned {
            map.serialize_entry("uuid", &self.uuid)?;
        }
        if let Some(batch_id) = &self.batch_id {
            map.serialize_entry("batch_id", batch_id)?;
        }
        map.serialize_entry("type", self.type_tag())?;
        serialize_section(
            &mut map,
            "content",
            &self.content,
            self.content.is_empty(),
            self.wire.content,
        )?;
        serialize_section(&mut map, "tags", &self.tags, self.tags.is_empty(), self.wire.tags)?;
        if let Some(at) = &self.recorded_at {
            match self.wire.recorded_at.as_deref() {
                Some(raw) if parse_recorded_at(raw).as_ref() == Some(at) => {
                    map.serialize_entry("recorded_at", raw)?
                }
                _ => map.serialize_entry("recorded_at", at)?,
            }
        }
        for (key, value) in &self.extra {
            if !MODELED_KEYS.contains(&key.as_str()) {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

/// An empty section is written back the way it was read.
fn serialize_section<M, T>(
    map: &mut M,
    key: &str,
    value: &T,
    empty: bool,
    presence: Presence,
) -> std::result::Result<(), M::Error>
where
    M: SerializeMap,
    T: Serialize,
{
    match (empty, presence) {
        (true, Presence::Absent) => Ok(()),
        (true, Presence::Null) => map.serialize_entry(key, &Value::Null),
        _ => map.serialize_entry(key, value),
    }
}

impl Entry {
    /// Create an empty entry of the given type, stamped now.
    pub fn new(entry_type: EntryType) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            batch_id: None,
            entry_type,
            content: Map::new(),
            tags: Vec::new(),
            recorded_at: Some(Utc::now()),
            extra: Map::new(),
            wire: WireShape::fresh(),
        }
    }

    /// Set a content field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.content.insert(key.into(), value.into());
        self
    }

    /// Replace the whole content object.
    pub fn with_content(mut self, content: Map<String, Value>) -> Self {
        self.content = content;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    pub fn with_batch_id(mut self, batch_id: Uuid) -> Self {
        self.batch_id = Some(batch_id);
        self
    }

    /// Type tag as written on the wire, keeping an accepted alias.
    pub fn type_tag(&self) -> &str {
        match &self.wire.type_tag {
            Some(tag) if EntryType::parse_str(tag) == self.entry_type => tag,
            _ => self.entry_type.as_str(),
        }
    }

    /// Decode an entry from a JSON document.
    ///
    /// Fails only when the document is not a structurally valid entry:
    /// missing `type`, or `content` that is not an object.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(s)?;
        Self::from_value(value)
    }

    /// Decode an entry from an already parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::InvalidEntry(format!("expected object, got {}", kind(&value))))?;
        if !obj.contains_key("type") {
            return Err(Error::InvalidEntry("missing `type`".to_string()));
        }
        if let Some(content) = obj.get("content") {
            if !content.is_object() && !content.is_null() {
                return Err(Error::ContentNotObject {
                    found: kind(content).to_string(),
                });
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    /// String content field, if present and a string.
    pub fn content_str(&self, key: &str) -> Option<&str> {
        self.content.get(key).and_then(Value::as_str)
    }

    /// Inbound request for the service worker script.
    pub fn is_service_worker_request(&self) -> bool {
        self.entry_type == EntryType::Request && self.content_str("uri") == Some(SERVICE_WORKER_URI)
    }

    /// Exception the application's handler would report.
    ///
    /// Exceptions are reportable unless upstream marked them with
    /// `"reportable": false`.
    pub fn is_reportable_exception(&self) -> bool {
        if !self.entry_type.capabilities().exception {
            return false;
        }
        self.content
            .get("reportable")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// Inbound request answered with a 5xx status.
    pub fn is_failed_request(&self) -> bool {
        if !self.entry_type.capabilities().http_request {
            return false;
        }
        self.response_status().is_some_and(|status| status >= 500)
    }

    /// Queued job whose final status is `failed`.
    pub fn is_failed_job(&self) -> bool {
        self.entry_type.capabilities().job && self.content_str("status") == Some("failed")
    }

    pub fn is_scheduled_task(&self) -> bool {
        self.entry_type.capabilities().scheduled
    }

    /// Whether any of the entry's tags is being monitored.
    pub fn has_monitored_tag(&self, monitored: &MonitoredTags) -> bool {
        !monitored.is_empty() && self.tags.iter().any(|tag| monitored.contains(tag))
    }

    /// HTTP status, read from `response_status` then `status`.
    fn response_status(&self) -> Option<u64> {
        self.content
            .get("response_status")
            .and_then(status_code)
            .or_else(|| self.content.get("status").and_then(status_code))
    }
}

fn status_code(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
