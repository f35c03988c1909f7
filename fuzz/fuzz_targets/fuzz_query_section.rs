//! Fuzz target for `[QUERY]` section parsing.

#![no_main]

use credal_core::text::{read_section, QUERY_SECTION};
use credal_core::{Engine, EngineConfig, NetworkSpec};
use libfuzzer_sys::fuzz_target;

fn config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.threads.workers = 1;
    config
}

fuzz_target!(|data: &[u8]| {
    // Tokenizer alone
    let _ = read_section(data, QUERY_SECTION);

    let mut net = NetworkSpec::new();
    let _ = net.add_variable("a", 2, &[]);
    let _ = net.add_variable("b", 4, &[]);
    let Ok(mut engine) = Engine::new(&net, config()) else {
        return;
    };
    if engine.insert_query_reader(data).is_ok() {
        for (_, mask) in engine.queries().iter() {
            assert!(mask.len() == 2 || mask.len() == 4);
        }
    }
});
