//! Lower/upper expectations of monitored variables.
//!
//! A node is monitored when its base-name has an entry in the
//! [`ModalTable`]. Its expectation under a vertex is `Σ vertex[m]·modal[m]`.

use std::collections::BTreeMap;

use crate::network::{CredalModel, NodeId};
use crate::store::ModalTable;

#[derive(Debug, Clone)]
struct Monitored {
    weights: Vec<f64>,
    min: f64,
    max: f64,
}

/// Expectation bounds per monitored node.
#[derive(Debug, Clone, Default)]
pub struct ExpectationTracker {
    nodes: BTreeMap<NodeId, Monitored>,
}

impl ExpectationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed every monitored node with `min = modal[last]`,
    /// `max = modal[first]`.
    pub fn initialize<N: CredalModel + ?Sized>(&mut self, model: &N, modals: &ModalTable) {
        self.nodes.clear();
        for node in model.nodes() {
            let Some(weights) = model
                .variable_name(node)
                .and_then(|name| modals.for_variable(name))
            else {
                continue;
            };
            let (Some(&first), Some(&last)) = (weights.first(), weights.last()) else {
                continue;
            };
            self.nodes.insert(
                node,
                Monitored {
                    weights: weights.to_vec(),
                    min: last,
                    max: first,
                },
            );
        }
    }

    /// Tighten the node's bounds with the expectation under `vertex`.
    /// Returns the expectation for monitored nodes.
    pub fn update(&mut self, node: NodeId, vertex: &[f64]) -> Option<f64> {
        let entry = self.nodes.get_mut(&node)?;
        let exp: f64 = vertex.iter().zip(&entry.weights).map(|(v, w)| v * w).sum();
        if exp > entry.max {
            entry.max = exp;
        }
        if exp < entry.min {
            entry.min = exp;
        }
        Some(exp)
    }

    pub fn min(&self, node: NodeId) -> Option<f64> {
        self.nodes.get(&node).map(|e| e.min)
    }

    pub fn max(&self, node: NodeId) -> Option<f64> {
        self.nodes.get(&node).map(|e| e.max)
    }

    pub fn is_monitored(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// `(node, min, max)` for every monitored node.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, f64, f64)> + '_ {
        self.nodes.iter().map(|(&n, e)| (n, e.min, e.max))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}
