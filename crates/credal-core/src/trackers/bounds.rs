//! Interval marginals.
//!
//! All nodes share four flat arrays (current min/max and their snapshots)
//! laid out node after node. The flat layout is what the partitioner and the
//! epsilon sweep operate on.

use serde::Serialize;
use std::collections::HashMap;

use crate::network::{CredalModel, NodeId};
use crate::partition::{partition, ThreadRanges};

/// Where a node's modalities live in the flat arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeSlot {
    pub node: NodeId,
    pub offset: usize,
    pub size: usize,
}

impl NodeSlot {
    fn span(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.size
    }
}

/// Borrowed arrays for one epsilon sweep.
pub(crate) struct EpsilonView<'a> {
    pub min: &'a [f64],
    pub max: &'a [f64],
    pub old_min: &'a mut [f64],
    pub old_max: &'a mut [f64],
    pub ranges: &'a ThreadRanges,
}

/// Lower/upper marginals per node.
#[derive(Debug, Clone, Default)]
pub struct BoundsTracker {
    min: Vec<f64>,
    max: Vec<f64>,
    old_min: Vec<f64>,
    old_max: Vec<f64>,
    layout: Vec<NodeSlot>,
    index: HashMap<NodeId, usize>,
    ranges: ThreadRanges,
}

impl BoundsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate seeded arrays for every node (min 1, max 0) and rebuild the
    /// worker ranges for `workers`.
    pub fn initialize<N: CredalModel + ?Sized>(&mut self, model: &N, workers: usize) {
        self.clear();

        let mut offset = 0;
        for node in model.nodes() {
            let size = model.domain_size(node).unwrap_or(0);
            self.index.insert(node, self.layout.len());
            self.layout.push(NodeSlot { node, offset, size });
            offset += size;
        }

        self.min = vec![1.0; offset];
        self.max = vec![0.0; offset];
        self.old_min = self.min.clone();
        self.old_max = self.max.clone();

        let sizes: Vec<usize> = self.layout.iter().map(|s| s.size).collect();
        self.ranges = partition(&sizes, workers);
    }

    /// Tighten the node's bounds against `vertex`. Returns false for nodes
    /// outside the layout.
    pub fn update(&mut self, node: NodeId, vertex: &[f64]) -> bool {
        let Some(slot) = self.slot(node) else {
            return false;
        };
        let span = slot.span();
        for ((lo, hi), &v) in self.min[span.clone()]
            .iter_mut()
            .zip(self.max[span].iter_mut())
            .zip(vertex)
        {
            if v < *lo {
                *lo = v;
            }
            if v > *hi {
                *hi = v;
            }
        }
        true
    }

    pub fn min(&self, node: NodeId) -> Option<&[f64]> {
        self.slot(node).map(|s| &self.min[s.span()])
    }

    pub fn max(&self, node: NodeId) -> Option<&[f64]> {
        self.slot(node).map(|s| &self.max[s.span()])
    }

    pub fn old_min(&self, node: NodeId) -> Option<&[f64]> {
        self.slot(node).map(|s| &self.old_min[s.span()])
    }

    pub fn old_max(&self, node: NodeId) -> Option<&[f64]> {
        self.slot(node).map(|s| &self.old_max[s.span()])
    }

    /// Node order and offsets in the flat arrays.
    pub fn layout(&self) -> &[NodeSlot] {
        &self.layout
    }

    pub fn ranges(&self) -> &ThreadRanges {
        &self.ranges
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.index.contains_key(&node)
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    /// Drop every node and reset the ranges to a single empty one.
    pub fn clear(&mut self) {
        self.min.clear();
        self.max.clear();
        self.old_min.clear();
        self.old_max.clear();
        self.layout.clear();
        self.index.clear();
        self.ranges = ThreadRanges::default();
    }

    pub(crate) fn epsilon_view(&mut self) -> EpsilonView<'_> {
        EpsilonView {
            min: &self.min,
            max: &self.max,
            old_min: &mut self.old_min,
            old_max: &mut self.old_max,
            ranges: &self.ranges,
        }
    }

    fn slot(&self, node: NodeId) -> Option<NodeSlot> {
        self.index.get(&node).map(|&i| self.layout[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NetworkSpec;

    fn tracker() -> BoundsTracker {
        let mut net = NetworkSpec::new();
        net.add_variable("A", 2, &[]).unwrap();
        net.add_variable("B", 3, &[]).unwrap();
        let mut bounds = BoundsTracker::new();
        bounds.initialize(&net, 2);
        bounds
    }

    #[test]
    fn test_seeds() {
        let bounds = tracker();
        assert_eq!(bounds.min(0), Some(&[1.0, 1.0][..]));
        assert_eq!(bounds.max(1), Some(&[0.0, 0.0, 0.0][..]));
        assert_eq!(bounds.old_min(1), Some(&[1.0, 1.0, 1.0][..]));
        assert_eq!(bounds.layout()[1].offset, 2);
        assert_eq!(bounds.ranges().workers(), 2);
        assert_eq!(bounds.ranges().total(), 5);
    }

    #[test]
    fn test_update_tightens_componentwise() {
        let mut bounds = tracker();
        assert!(bounds.update(0, &[0.3, 0.7]));
        assert!(bounds.update(0, &[0.6, 0.4]));
        assert_eq!(bounds.min(0), Some(&[0.3, 0.4][..]));
        assert_eq!(bounds.max(0), Some(&[0.6, 0.7][..]));
        // Other node untouched, snapshots untouched.
        assert_eq!(bounds.min(1), Some(&[1.0, 1.0, 1.0][..]));
        assert_eq!(bounds.old_min(0), Some(&[1.0, 1.0][..]));
    }

    #[test]
    fn test_unknown_node_ignored() {
        let mut bounds = tracker();
        assert!(!bounds.update(7, &[0.5]));
        assert!(bounds.min(7).is_none());
    }

    #[test]
    fn test_clear() {
        let mut bounds = tracker();
        bounds.clear();
        assert!(bounds.is_empty());
        assert_eq!(bounds.ranges().workers(), 1);
    }
}
