//! Structured event vocabulary.
//!
//! Every engine log record carries an `event` field drawn from
//! [`event_names`] and, where relevant, the [`Stage`] it belongs to.

use serde::{Deserialize, Serialize};

/// Engine stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Tracker allocation and clustering.
    Init,
    /// Evidence, query and modal insertion.
    Input,
    /// Propagation iterations.
    Iterate,
    /// Post-run aggregation.
    Aggregate,
    /// Writing result files.
    Output,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Stage::Init => "init",
            Stage::Input => "input",
            Stage::Iterate => "iterate",
            Stage::Aggregate => "aggregate",
            Stage::Output => "output",
        })
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_ITERATION: &str = "run.iteration";
    pub const RUN_FINISHED: &str = "run.finished";
    pub const RUN_FAILED: &str = "run.failed";

    // Initialization
    pub const ENGINE_INITIALIZED: &str = "engine.initialized";
    pub const ENGINE_RESET: &str = "engine.reset";
    pub const CLUSTERS_BUILT: &str = "clusters.built";
    pub const CLUSTER_UNMATCHED: &str = "clusters.unmatched";

    // Inputs
    pub const EVIDENCE_INSERTED: &str = "evidence.inserted";
    pub const QUERY_INSERTED: &str = "query.inserted";
    pub const MODALS_INSERTED: &str = "modals.inserted";
    pub const ENTRY_SKIPPED: &str = "input.skipped";

    // Trackers
    pub const VERTICES_REDUCED: &str = "vertices.reduced";
    pub const REDUCTION_FAILED: &str = "vertices.reduction_failed";
    pub const EPSILON_SEQUENTIAL: &str = "epsilon.sequential";
    pub const EXPECTATIONS_AGGREGATED: &str = "expectations.aggregated";

    // Output
    pub const OUTPUT_WRITTEN: &str = "output.written";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_serialization() {
        assert_eq!(serde_json::to_string(&Stage::Iterate).unwrap(), "\"iterate\"");
        assert_eq!(Stage::Output.to_string(), "output");
    }

    #[test]
    fn test_event_names_are_dotted() {
        for name in [
            event_names::RUN_STARTED,
            event_names::ENTRY_SKIPPED,
            event_names::VERTICES_REDUCED,
        ] {
            assert!(name.contains('.'));
        }
    }
}
