//! Fuzz target for `[EVIDENCE]` section parsing.
//!
//! Arbitrary text must only ever produce skip reports, never a panic.

#![no_main]

use credal_core::{CredalModel, Engine, EngineConfig, NetworkSpec};
use libfuzzer_sys::fuzz_target;

fn config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.threads.workers = 1;
    config
}

fuzz_target!(|data: &[u8]| {
    let mut net = NetworkSpec::new();
    let _ = net.add_variable("a", 2, &[]);
    let _ = net.add_variable("b", 3, &["a"]);
    let Ok(mut engine) = Engine::new(&net, config()) else {
        return;
    };
    if let Ok(report) = engine.insert_evidence_reader(data) {
        for name in &report.applied {
            let node = net.node_id(name).expect("applied entries name known variables");
            assert!(engine.evidence().contains(node));
        }
    }
});
