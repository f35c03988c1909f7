//! Credal Network Inference Core Library
//!
//! This library provides the generic approximate-inference engine for
//! credal networks:
//! - Interval (lower/upper) marginal tracking per node
//! - Posterior credal set vertex tracking with hull reduction
//! - Evidence, query and modal-value stores with text parsers
//! - Multi-threaded convergence (epsilon) computation
//! - Expectation tracking for static and time-sliced networks
//!
//! Concrete propagation algorithms plug in through [`engine::Propagation`].

pub mod convergence;
pub mod dynamic;
pub mod engine;
pub mod error;
pub mod logging;
pub mod network;
pub mod output;
pub mod partition;
pub mod scheme;
pub mod store;
pub mod text;
pub mod trackers;

pub use credal_config::EngineConfig;
pub use credal_math::{HullReducer, PolytopeReducer};
pub use convergence::ConvergenceEvaluator;
pub use dynamic::{DynamicClusters, DynamicExpectations};
pub use engine::{
    Engine, EngineState, Propagation, PropagationContext, RunSummary, SampleSink,
};
pub use error::{CredalError, ErrorKind, Result};
pub use network::{CredalModel, NetworkSpec, NodeId};
pub use scheme::{ApproximationScheme, SchemeState};
pub use store::{Evidence, InsertReport, ModalTable, Queries, SkipReason, SkippedEntry};

// Re-export test utilities for integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
