//! Extreme points of each node's posterior credal set.

use std::collections::BTreeMap;
use std::fmt;

use credal_math::{approx_eq_slice, is_on_face, HullReducer, PolytopeReducer, VERTEX_TOLERANCE};

use crate::logging::event_names;
use crate::network::{CredalModel, NodeId};

/// Outcome of [`VertexTracker::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexUpdate {
    /// Node has no vertex set.
    UnknownNode,
    /// An equal vertex (within tolerance) is already stored.
    Duplicate,
    /// The vertex was appended.
    Added {
        /// Entries dropped for lying strictly inside the bounds box.
        interior_removed: usize,
        /// Entries dropped by the polytope reducer.
        redundant_removed: usize,
    },
}

/// Vertex sets per node.
pub struct VertexTracker {
    sets: BTreeMap<NodeId, Vec<Vec<f64>>>,
    reducer: Box<dyn PolytopeReducer>,
}

impl fmt::Debug for VertexTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VertexTracker")
            .field("sets", &self.sets)
            .finish_non_exhaustive()
    }
}

impl Default for VertexTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexTracker {
    /// Tracker using [`HullReducer`] for redundancy elimination.
    pub fn new() -> Self {
        Self::with_reducer(Box::new(HullReducer::new()))
    }

    pub fn with_reducer(reducer: Box<dyn PolytopeReducer>) -> Self {
        Self {
            sets: BTreeMap::new(),
            reducer,
        }
    }

    pub fn set_reducer(&mut self, reducer: Box<dyn PolytopeReducer>) {
        self.reducer = reducer;
    }

    /// One empty set per node.
    pub fn initialize<N: CredalModel + ?Sized>(&mut self, model: &N) {
        self.sets = model.nodes().into_iter().map(|n| (n, Vec::new())).collect();
    }

    /// Record `vertex` for `node`.
    ///
    /// `lower`/`upper` are the node's current bounds, already tightened
    /// against `vertex`.
    pub fn update(
        &mut self,
        node: NodeId,
        vertex: &[f64],
        lower: &[f64],
        upper: &[f64],
        eliminate_redundant: bool,
    ) -> VertexUpdate {
        let Some(set) = self.sets.get_mut(&node) else {
            return VertexUpdate::UnknownNode;
        };
        if set
            .iter()
            .any(|v| approx_eq_slice(v, vertex, VERTEX_TOLERANCE))
        {
            return VertexUpdate::Duplicate;
        }

        set.push(vertex.to_vec());

        let mut interior_removed = 0;
        if set.len() > 1 {
            let before = set.len();
            set.retain(|v| is_on_face(v, lower, upper, VERTEX_TOLERANCE));
            interior_removed = before - set.len();
        }

        let mut redundant_removed = 0;
        if eliminate_redundant && set.len() > 2 {
            let dimension = vertex.len();
            match self.reducer.reduce(dimension, set) {
                Ok(reduced) if reduced.len() <= set.len() => {
                    redundant_removed = set.len() - reduced.len();
                    *set = reduced;
                    tracing::trace!(
                        event = event_names::VERTICES_REDUCED,
                        node,
                        kept = set.len(),
                        removed = redundant_removed,
                        "vertex set reduced"
                    );
                }
                Ok(reduced) => {
                    tracing::warn!(
                        event = event_names::REDUCTION_FAILED,
                        node,
                        input = set.len(),
                        output = reduced.len(),
                        "reducer returned more points than it received; keeping set"
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        event = event_names::REDUCTION_FAILED,
                        node,
                        error = %err,
                        "redundancy elimination failed; keeping set"
                    );
                }
            }
        }

        VertexUpdate::Added {
            interior_removed,
            redundant_removed,
        }
    }

    pub fn get(&self, node: NodeId) -> Option<&[Vec<f64>]> {
        self.sets.get(&node).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &[Vec<f64>])> {
        self.sets.iter().map(|(&n, v)| (n, v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn clear(&mut self) {
        self.sets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NetworkSpec;
    use credal_math::ReductionError;

    fn tracker() -> VertexTracker {
        let net = NetworkSpec::new().with_variable("A", 2, &[]).unwrap();
        let mut t = VertexTracker::new();
        t.initialize(&net);
        t
    }

    #[test]
    fn test_duplicate_within_tolerance() {
        let mut t = tracker();
        let box_ = ([0.3, 0.7], [0.3, 0.70001]);
        t.update(0, &[0.3, 0.7], &box_.0, &box_.1, false);
        assert_eq!(
            t.update(0, &[0.3, 0.7000001], &box_.0, &box_.1, false),
            VertexUpdate::Duplicate
        );
        assert_eq!(t.get(0).unwrap().len(), 1);

        t.update(0, &[0.3, 0.70001], &box_.0, &box_.1, false);
        assert_eq!(t.get(0).unwrap().len(), 2);
    }

    #[test]
    fn test_interior_points_removed() {
        let net = NetworkSpec::new().with_variable("A", 3, &[]).unwrap();
        let mut t = VertexTracker::new();
        t.initialize(&net);

        let lower = [0.1, 0.1, 0.1];
        let upper = [0.8, 0.8, 0.8];
        t.update(0, &[0.8, 0.1, 0.1], &lower, &upper, false);
        // Strictly inside the box on every component.
        t.sets.get_mut(&0).unwrap().push(vec![0.3, 0.4, 0.3]);
        let outcome = t.update(0, &[0.1, 0.8, 0.1], &lower, &upper, false);
        assert_eq!(
            outcome,
            VertexUpdate::Added {
                interior_removed: 1,
                redundant_removed: 0
            }
        );
        assert_eq!(t.get(0).unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_node() {
        let mut t = tracker();
        assert_eq!(t.update(9, &[1.0], &[1.0], &[1.0], false), VertexUpdate::UnknownNode);
    }

    struct Growing;

    impl PolytopeReducer for Growing {
        fn reduce(&self, _: usize, points: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ReductionError> {
            let mut out = points.to_vec();
            out.push(points[0].clone());
            Ok(out)
        }
    }

    #[test]
    fn test_growing_reducer_rejected() {
        let net = NetworkSpec::new().with_variable("A", 3, &[]).unwrap();
        let mut t = VertexTracker::with_reducer(Box::new(Growing));
        t.initialize(&net);
        let lower = [0.0; 3];
        let upper = [1.0; 3];
        for v in [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]] {
            t.update(0, &v, &lower, &upper, true);
        }
        assert_eq!(t.get(0).unwrap().len(), 3);
    }

    #[test]
    fn test_reducer_drops_redundant_point() {
        let net = NetworkSpec::new().with_variable("A", 3, &[]).unwrap();
        let mut t = VertexTracker::new();
        t.initialize(&net);
        let lower = [0.0; 3];
        let upper = [1.0; 3];
        for v in [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]] {
            t.update(0, &v, &lower, &upper, true);
        }
        // On the x=0 face but inside the hull of the three corners.
        let outcome = t.update(0, &[0.0, 0.5, 0.5], &lower, &upper, true);
        assert_eq!(
            outcome,
            VertexUpdate::Added {
                interior_removed: 0,
                redundant_removed: 1
            }
        );
        assert_eq!(t.get(0).unwrap().len(), 3);
    }
}
