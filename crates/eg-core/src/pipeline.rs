//! Redaction → admission pipeline.
//!
//! Entries are scrubbed first, then admitted or dropped. Retained entries
//! are handed to a [`Sink`]. The pipeline itself is immutable after
//! construction and can process entries from many threads at once.

use crate::filter::{Admission, AdmissionFilter, DropReason, KeepReason};
use crate::sink::Sink;
use crate::PipelineError;
use eg_common::{Entry, EntryType, Environment, MonitoredTags};
use eg_config::Settings;
use eg_redact::{RedactionPolicy, Redactor};
use serde::Serialize;
use uuid::Uuid;

/// Result of processing one entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Kept {
        entry: Entry,
        reason: KeepReason,
        /// Number of fields masked by the redactor.
        masked: usize,
    },
    Dropped {
        uuid: Uuid,
        entry_type: EntryType,
        reason: DropReason,
    },
}

impl Outcome {
    pub fn is_kept(&self) -> bool {
        matches!(self, Outcome::Kept { .. })
    }

    /// The retained entry, if any.
    pub fn into_entry(self) -> Option<Entry> {
        match self {
            Outcome::Kept { entry, .. } => Some(entry),
            Outcome::Dropped { .. } => None,
        }
    }
}

/// Counters for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub seen: usize,
    pub kept: usize,
    pub dropped: usize,
    pub dropped_service_worker: usize,
    /// Fields masked across retained entries.
    pub masked_fields: usize,
    /// Input records that could not be decoded.
    pub malformed: usize,
}

impl PipelineStats {
    fn record(&mut self, outcome: &Outcome) {
        self.seen += 1;
        match outcome {
            Outcome::Kept { masked, .. } => {
                self.kept += 1;
                self.masked_fields += masked;
            }
            Outcome::Dropped { reason, .. } => {
                self.dropped += 1;
                if *reason == DropReason::ServiceWorker {
                    self.dropped_service_worker += 1;
                }
            }
        }
    }

    pub fn record_malformed(&mut self) {
        self.malformed += 1;
    }
}

/// Redactor and admission filter bound to one environment.
#[derive(Debug, Clone)]
pub struct Pipeline {
    redactor: Redactor,
    filter: AdmissionFilter,
}

impl Pipeline {
    pub fn new(environment: Environment, policy: RedactionPolicy, monitored: MonitoredTags) -> Self {
        Self {
            redactor: Redactor::new(environment.clone(), policy),
            filter: AdmissionFilter::new(environment).with_monitored_tags(monitored),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.environment.clone(),
            settings.policy.clone(),
            settings.monitored_tags.clone(),
        )
    }

    pub fn environment(&self) -> &Environment {
        self.filter.environment()
    }

    pub fn redactor(&self) -> &Redactor {
        &self.redactor
    }

    pub fn filter(&self) -> &AdmissionFilter {
        &self.filter
    }

    /// Redact then admit one entry.
    pub fn process(&self, entry: Entry) -> Option<Entry> {
        self.evaluate(entry).into_entry()
    }

    /// Redact then admit one entry, keeping the decision details.
    pub fn evaluate(&self, entry: Entry) -> Outcome {
        let (entry, report) = self.redactor.apply(entry);
        match self.filter.decide(&entry) {
            Admission::Keep(reason) => Outcome::Kept {
                entry,
                reason,
                masked: report.len(),
            },
            Admission::Drop(reason) => {
                tracing::debug!(
                    uuid = %entry.uuid,
                    entry_type = %entry.entry_type,
                    reason = %reason,
                    "entry dropped"
                );
                Outcome::Dropped {
                    uuid: entry.uuid,
                    entry_type: entry.entry_type,
                    reason,
                }
            }
        }
    }

    /// Process one entry and hand it to `sink` if retained.
    pub fn feed(
        &self,
        entry: Entry,
        sink: &mut dyn Sink,
        stats: &mut PipelineStats,
    ) -> Result<(), PipelineError> {
        let outcome = self.evaluate(entry);
        stats.record(&outcome);
        if let Some(entry) = outcome.into_entry() {
            sink.accept(entry)?;
        }
        Ok(())
    }

    /// Process every entry, then flush the sink.
    pub fn run<I>(&self, entries: I, sink: &mut dyn Sink) -> Result<PipelineStats, PipelineError>
    where
        I: IntoIterator<Item = Entry>,
    {
        let mut stats = PipelineStats::default();
        for entry in entries {
            self.feed(entry, sink, &mut stats)?;
        }
        sink.flush()?;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use serde_json::json;

    fn pipeline(env: Environment) -> Pipeline {
        Pipeline::new(env, RedactionPolicy::default(), MonitoredTags::new())
    }

    #[test]
    fn test_pipeline_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Pipeline>();
    }

    #[test]
    fn test_failed_request_kept_and_redacted() {
        let entry = Entry::new(EntryType::Request)
            .with_field("uri", "/checkout")
            .with_field("response_status", 500)
            .with_field("parameters", json!({"password": "hunter2", "item": 7}));

        match pipeline(Environment::Production).evaluate(entry) {
            Outcome::Kept {
                entry,
                reason,
                masked,
            } => {
                assert_eq!(reason, KeepReason::FailedRequest);
                assert_eq!(masked, 1);
                assert_eq!(entry.content["parameters"]["password"], "********");
                assert_eq!(entry.content["parameters"]["item"], 7);
            }
            other => panic!("expected kept entry, got {other:?}"),
        }
    }

    #[test]
    fn test_dropped_outcome_carries_identity() {
        let entry = Entry::new(EntryType::Query).with_field("sql", "select 1");
        let uuid = entry.uuid;
        match pipeline(Environment::Staging).evaluate(entry) {
            Outcome::Dropped {
                uuid: dropped,
                entry_type,
                reason,
            } => {
                assert_eq!(dropped, uuid);
                assert_eq!(entry_type, EntryType::Query);
                assert_eq!(reason, DropReason::NotImportant);
            }
            other => panic!("expected drop, got {other:?}"),
        }
    }

    #[test]
    fn test_local_passes_entries_through_untouched() {
        let entry = Entry::new(EntryType::Request)
            .with_field("uri", "/login")
            .with_field("parameters", json!({"password": "secret"}));
        let kept = pipeline(Environment::Local)
            .process(entry.clone())
            .expect("kept locally");
        assert_eq!(kept, entry);
    }

    #[test]
    fn test_run_collects_stats() {
        let entries = vec![
            Entry::new(EntryType::Request).with_field("uri", "sw.js"),
            Entry::new(EntryType::Request)
                .with_field("uri", "/")
                .with_field("response_status", 200),
            Entry::new(EntryType::Exception).with_field("class", "RuntimeException"),
            Entry::new(EntryType::Job).with_field("status", "failed"),
            Entry::new(EntryType::Request)
                .with_field("response_status", 503)
                .with_field("headers", json!({"Authorization": "Bearer t"})),
        ];

        let mut sink = MemorySink::new();
        let stats = pipeline(Environment::Production)
            .run(entries, &mut sink)
            .unwrap();

        assert_eq!(stats.seen, 5);
        assert_eq!(stats.kept, 3);
        assert_eq!(stats.dropped, 2);
        assert_eq!(stats.dropped_service_worker, 1);
        assert_eq!(stats.masked_fields, 1);
        assert_eq!(stats.malformed, 0);
        assert_eq!(sink.entries().len(), 3);
        assert_eq!(sink.entries()[2].content["headers"]["Authorization"], "********");
    }

    #[test]
    fn test_monitored_tag_keeps_entry() {
        let pipeline = Pipeline::new(
            Environment::Production,
            RedactionPolicy::default(),
            ["vip"].into_iter().collect(),
        );
        let entry = Entry::new(EntryType::Query).with_tag("vip");
        assert!(pipeline.process(entry).is_some());
        assert!(pipeline
            .process(Entry::new(EntryType::Query).with_tag("other"))
            .is_none());
    }
}
