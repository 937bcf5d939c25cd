//! Fuzz target for entrygate.json parsing and validation.

#![no_main]

use eg_config::{ConfigFile, Settings};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Parse and validation errors are expected; panics are not.
    if let Ok(file) = ConfigFile::parse(text) {
        let _ = Settings::from_file(&file, Some("production"));
    }
});
