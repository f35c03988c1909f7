//! Per-node state accumulated while a propagation strategy runs.
//!
//! - [`BoundsTracker`]: lower/upper marginals and their previous snapshots
//! - [`VertexTracker`]: extreme points of each posterior credal set
//! - [`ExpectationTracker`]: lower/upper expectations of monitored variables
//!
//! All three are updated on the driving thread; only the epsilon sweep over
//! [`BoundsTracker`] runs on worker threads (see [`crate::convergence`]).

pub mod bounds;
pub mod expectation;
pub mod vertices;

pub use bounds::{BoundsTracker, NodeSlot};
pub use expectation::ExpectationTracker;
pub use vertices::{VertexTracker, VertexUpdate};
