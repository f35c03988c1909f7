//! Fuzz target for modal value files.

#![no_main]

use credal_core::{Engine, EngineConfig, NetworkSpec};
use libfuzzer_sys::fuzz_target;

fn config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.threads.workers = 1;
    config
}

fuzz_target!(|data: &[u8]| {
    let mut net = NetworkSpec::new();
    let _ = net.add_variable("x_0", 2, &[]);
    let _ = net.add_variable("x_1", 2, &["x_0"]);
    let _ = net.add_variable("y_0", 3, &[]);
    let Ok(mut engine) = Engine::new(&net, config()) else {
        return;
    };
    let _ = engine.insert_modals_reader(data);
    let _ = engine.initialize();
    let _ = engine.dynamic_expectations();
});
