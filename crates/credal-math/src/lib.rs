//! Numerical primitives for credal network inference.
//!
//! This crate provides:
//! - Tolerance-aware comparisons for probability vectors
//! - A dense phase-one simplex for nonnegative feasibility problems
//! - Convex-hull redundancy elimination for vertex lists ([`HullReducer`])
//!
//! The engine in `credal-core` only depends on the [`PolytopeReducer`] trait;
//! [`HullReducer`] is the default implementation.

pub mod approx;
pub mod hull;
pub mod simplex;

pub use approx::{approx_eq_slice, is_on_face, max_abs_diff, VERTEX_TOLERANCE};
pub use hull::{HullReducer, PolytopeReducer, ReductionError, ReductionStats};
pub use simplex::{nonnegative_feasible, SimplexError, FEASIBILITY_TOLERANCE};
