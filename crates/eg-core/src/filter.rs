//! Admission filter.
//!
//! Decides per entry whether it proceeds to the sink. Rules, first match
//! wins:
//! 1. Service worker requests (`uri == "sw.js"`) are dropped everywhere.
//! 2. In the local environment everything else is kept.
//! 3. Elsewhere only important entries are kept: reportable exceptions,
//!    failed requests, failed jobs, scheduled tasks, and entries carrying a
//!    monitored tag.

use eg_common::{Entry, Environment, MonitoredTags};
use serde::Serialize;

/// Why an entry was kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeepReason {
    LocalEnvironment,
    ReportableException,
    FailedRequest,
    FailedJob,
    ScheduledTask,
    MonitoredTag,
}

/// Why an entry was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Service worker script request.
    ServiceWorker,
    /// Routine entry outside the local environment.
    NotImportant,
}

/// Admission decision for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum Admission {
    Keep(KeepReason),
    Drop(DropReason),
}

impl Admission {
    pub fn is_keep(&self) -> bool {
        matches!(self, Admission::Keep(_))
    }
}

impl std::fmt::Display for KeepReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            KeepReason::LocalEnvironment => "local_environment",
            KeepReason::ReportableException => "reportable_exception",
            KeepReason::FailedRequest => "failed_request",
            KeepReason::FailedJob => "failed_job",
            KeepReason::ScheduledTask => "scheduled_task",
            KeepReason::MonitoredTag => "monitored_tag",
        };
        write!(f, "{}", s)
    }
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::ServiceWorker => write!(f, "service_worker"),
            DropReason::NotImportant => write!(f, "not_important"),
        }
    }
}

/// Environment-aware admission filter.
///
/// Holds only read-only configuration; share it freely across threads.
#[derive(Debug, Clone)]
pub struct AdmissionFilter {
    environment: Environment,
    monitored: MonitoredTags,
}

impl AdmissionFilter {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            monitored: MonitoredTags::new(),
        }
    }

    /// Keep entries carrying any of these tags outside the local environment.
    pub fn with_monitored_tags(mut self, monitored: MonitoredTags) -> Self {
        self.monitored = monitored;
        self
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn monitored_tags(&self) -> &MonitoredTags {
        &self.monitored
    }

    /// Decide the fate of `entry`, with the reason.
    pub fn decide(&self, entry: &Entry) -> Admission {
        decide(entry, &self.environment, &self.monitored)
    }

    pub fn should_keep(&self, entry: &Entry) -> bool {
        self.decide(entry).is_keep()
    }
}

/// Whether `entry` is retained in `env`, with no monitored tags configured.
pub fn should_keep(entry: &Entry, env: &Environment) -> bool {
    decide(entry, env, &MonitoredTags::new()).is_keep()
}

fn decide(entry: &Entry, env: &Environment, monitored: &MonitoredTags) -> Admission {
    if entry.is_service_worker_request() {
        return Admission::Drop(DropReason::ServiceWorker);
    }

    if env.is_local() {
        return Admission::Keep(KeepReason::LocalEnvironment);
    }

    if entry.is_reportable_exception() {
        Admission::Keep(KeepReason::ReportableException)
    } else if entry.is_failed_request() {
        Admission::Keep(KeepReason::FailedRequest)
    } else if entry.is_failed_job() {
        Admission::Keep(KeepReason::FailedJob)
    } else if entry.is_scheduled_task() {
        Admission::Keep(KeepReason::ScheduledTask)
    } else if entry.has_monitored_tag(monitored) {
        Admission::Keep(KeepReason::MonitoredTag)
    } else {
        Admission::Drop(DropReason::NotImportant)
    }
}
