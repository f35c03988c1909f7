//! Redundancy elimination for vertex lists.
//!
//! A point is redundant when it lies in the convex hull of the other points
//! of the list: removing it leaves the represented polytope unchanged.
//! Membership is decided with [`nonnegative_feasible`] on the system
//!
//! ```text
//! Σ_j λ_j · p_j = q,   Σ_j λ_j = 1,   λ >= 0
//! ```
//!
//! Points are tested in order against the points still kept, so exact
//! duplicates collapse onto their last occurrence and the hull of the
//! surviving list always equals the hull of the input.

use serde::Serialize;
use thiserror::Error;

use crate::simplex::{nonnegative_feasible, SimplexError};

/// Errors from polytope reduction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReductionError {
    #[error("point {index} has dimension {found}, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("hull membership test failed for point {index}: {source}")]
    Solver {
        index: usize,
        #[source]
        source: SimplexError,
    },
}

/// A service that removes redundant points from a vertex list.
///
/// Implementations must never return more points than they were given, and
/// must keep every point that lies outside the hull of the others.
pub trait PolytopeReducer: Send + Sync {
    /// Reduce `points` (each of length `dimension`) to the extreme points of
    /// their convex hull.
    fn reduce(&self, dimension: usize, points: &[Vec<f64>])
        -> Result<Vec<Vec<f64>>, ReductionError>;
}

/// Counters describing one reduction call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReductionStats {
    /// Points received.
    pub input: usize,
    /// Points kept.
    pub kept: usize,
    /// Membership problems solved.
    pub lp_solves: usize,
}

/// Default [`PolytopeReducer`] based on LP hull-membership tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct HullReducer;

impl HullReducer {
    pub fn new() -> Self {
        Self
    }

    /// Reduce and report counters alongside the surviving points.
    pub fn reduce_with_stats(
        &self,
        dimension: usize,
        points: &[Vec<f64>],
    ) -> Result<(Vec<Vec<f64>>, ReductionStats), ReductionError> {
        for (index, point) in points.iter().enumerate() {
            if point.len() != dimension {
                return Err(ReductionError::DimensionMismatch {
                    index,
                    expected: dimension,
                    found: point.len(),
                });
            }
        }

        let mut stats = ReductionStats {
            input: points.len(),
            ..Default::default()
        };
        let mut keep = vec![true; points.len()];

        for i in 0..points.len() {
            let others: Vec<&[f64]> = points
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i && keep[j])
                .map(|(_, p)| p.as_slice())
                .collect();
            if others.is_empty() {
                continue;
            }

            stats.lp_solves += 1;
            let inside = in_hull(&points[i], &others)
                .map_err(|source| ReductionError::Solver { index: i, source })?;
            if inside {
                keep[i] = false;
            }
        }

        let reduced: Vec<Vec<f64>> = points
            .iter()
            .zip(&keep)
            .filter(|(_, &k)| k)
            .map(|(p, _)| p.clone())
            .collect();
        stats.kept = reduced.len();
        Ok((reduced, stats))
    }
}

impl PolytopeReducer for HullReducer {
    fn reduce(
        &self,
        dimension: usize,
        points: &[Vec<f64>],
    ) -> Result<Vec<Vec<f64>>, ReductionError> {
        self.reduce_with_stats(dimension, points)
            .map(|(reduced, _)| reduced)
    }
}

/// Is `query` a convex combination of `generators`?
fn in_hull(query: &[f64], generators: &[&[f64]]) -> Result<bool, SimplexError> {
    let dimension = query.len();
    let mut matrix = Vec::with_capacity(dimension + 1);
    for m in 0..dimension {
        matrix.push(generators.iter().map(|g| g[m]).collect::<Vec<f64>>());
    }
    matrix.push(vec![1.0; generators.len()]);

    let mut rhs = query.to_vec();
    rhs.push(1.0);

    nonnegative_feasible(&matrix, &rhs)
}
