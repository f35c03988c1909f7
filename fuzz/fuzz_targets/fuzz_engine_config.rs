//! Fuzz target for engine.json configuration parsing.
//!
//! Parsing and validation must reject bad input with an error, never panic.

#![no_main]

use credal_config::{validate_config, EngineConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = EngineConfig::from_str(text) {
        if validate_config(&config).is_ok() {
            let _ = config.approximation.max_time();
            let _ = config.threads.resolved_workers();
        }
    }
});
