//! Fuzz target for entry decoding and the redact → admit pipeline.
//!
//! Entries arrive from upstream collectors and may be arbitrary JSON.
//! Decoding may fail; redaction and admission must never panic, and
//! redacting twice must equal redacting once.

#![no_main]

use eg_common::{Entry, Environment, MonitoredTags};
use eg_core::Pipeline;
use eg_redact::{RedactionPolicy, Redactor};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(entry) = Entry::from_json_str(text) else {
        return;
    };

    let redactor = Redactor::new(Environment::Production, RedactionPolicy::default());
    let once = redactor.redact(&entry);
    assert_eq!(redactor.redact(&once), once);
    assert_eq!(once.content.len(), entry.content.len());

    let pipeline = Pipeline::new(
        Environment::Production,
        RedactionPolicy::default(),
        ["monitored"].into_iter().collect::<MonitoredTags>(),
    );
    let _ = pipeline.evaluate(entry);
});
