//! Time-sliced (dynamic) network support.
//!
//! Dynamic networks name every variable `<base>_<step>`: `rain_0` is the
//! initial slice, `rain_1` the first transition and `rain_5` a later copy
//! that shares parameters with one of them. Clustering groups the later
//! copies under the anchor whose conditional table they repeat.
//!
//! # Passes
//!
//! 1. Every `*_0` node becomes a t0 anchor.
//! 2. Every `*_1` node joins a t0 anchor with the same base-name and table
//!    dimension, or becomes a t1 anchor.
//! 3. Every other node joins a matching t0 anchor, else a matching t1 anchor.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{CredalError, Result};
use crate::logging::event_names;
use crate::network::{CredalModel, NodeId};

/// Split `name` at its first underscore into (base, time step).
pub fn split_variable_name(name: &str) -> (&str, Option<&str>) {
    match name.split_once('_') {
        Some((base, step)) => (base, Some(step)),
        None => (name, None),
    }
}

/// The part of `name` before its first underscore, or all of it.
pub fn base_name(name: &str) -> &str {
    split_variable_name(name).0
}

/// Anchor → later time copies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DynamicClusters {
    pub t0: BTreeMap<NodeId, Vec<NodeId>>,
    pub t1: BTreeMap<NodeId, Vec<NodeId>>,
    /// Largest time step seen.
    pub time_steps: usize,
}

impl DynamicClusters {
    /// Number of nodes placed in a cluster, anchors included.
    pub fn clustered_nodes(&self) -> usize {
        self.t0
            .values()
            .chain(self.t1.values())
            .map(|copies| copies.len() + 1)
            .sum()
    }
}

struct Named<'a> {
    node: NodeId,
    name: &'a str,
    base: &'a str,
    step: &'a str,
    dimension: Option<usize>,
}

/// Builds [`DynamicClusters`] from variable names.
pub struct DynamicClusterBuilder;

impl DynamicClusterBuilder {
    pub fn build<N: CredalModel + ?Sized>(model: &N) -> Result<DynamicClusters> {
        let mut named = Vec::new();
        for node in model.nodes() {
            let name = model.variable_name(node).ok_or(CredalError::UnknownNode(node))?;
            let (base, step) = split_variable_name(name);
            let step = step.ok_or_else(|| CredalError::MalformedDynamicNetwork {
                name: name.to_string(),
                reason: "has no time step suffix".to_string(),
            })?;
            named.push(Named {
                node,
                name,
                base,
                step,
                dimension: model.table_dimension(node),
            });
        }

        let mut clusters = DynamicClusters::default();

        for var in named.iter().filter(|v| v.step == "0") {
            clusters.t0.insert(var.node, Vec::new());
        }

        for var in named.iter().filter(|v| v.step == "1") {
            match find_anchor(&named, &clusters.t0, var) {
                Some(anchor) => push_copy(&mut clusters.t0, anchor, var.node),
                None => {
                    clusters.t1.insert(var.node, Vec::new());
                }
            }
            clusters.time_steps = clusters.time_steps.max(1);
        }

        for var in named.iter().filter(|v| v.step != "0" && v.step != "1") {
            let step: usize = var.step.parse().map_err(|_| CredalError::MalformedDynamicNetwork {
                name: var.name.to_string(),
                reason: format!("has non-integer time step {:?}", var.step),
            })?;
            clusters.time_steps = clusters.time_steps.max(step);

            if let Some(anchor) = find_anchor(&named, &clusters.t0, var) {
                push_copy(&mut clusters.t0, anchor, var.node);
            } else if let Some(anchor) = find_anchor(&named, &clusters.t1, var) {
                push_copy(&mut clusters.t1, anchor, var.node);
            } else {
                tracing::debug!(
                    event = event_names::CLUSTER_UNMATCHED,
                    variable = var.name,
                    step,
                    "no anchor with matching base-name and table dimension"
                );
            }
        }

        tracing::debug!(
            event = event_names::CLUSTERS_BUILT,
            t0 = clusters.t0.len(),
            t1 = clusters.t1.len(),
            time_steps = clusters.time_steps,
            "dynamic clusters built"
        );
        Ok(clusters)
    }
}

fn find_anchor(
    named: &[Named<'_>],
    anchors: &BTreeMap<NodeId, Vec<NodeId>>,
    var: &Named<'_>,
) -> Option<NodeId> {
    named
        .iter()
        .filter(|a| anchors.contains_key(&a.node))
        .find(|a| a.base == var.base && a.dimension == var.dimension)
        .map(|a| a.node)
}

fn push_copy(anchors: &mut BTreeMap<NodeId, Vec<NodeId>>, anchor: NodeId, node: NodeId) {
    if let Some(copies) = anchors.get_mut(&anchor) {
        copies.push(node);
    }
}

/// Per base-name expectation bounds indexed by time step.
///
/// Steps with no monitored node hold NaN.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DynamicExpectations {
    pub min: BTreeMap<String, Vec<f64>>,
    pub max: BTreeMap<String, Vec<f64>>,
}

impl DynamicExpectations {
    /// Group per-node bounds `(variable name, min, max)` by base-name and
    /// time step.
    ///
    /// Steps must be below `step_limit`; the engine passes the node count,
    /// since a network with more slices than nodes cannot exist.
    pub fn aggregate<'a, I>(entries: I, step_limit: usize) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, f64, f64)>,
    {
        let mut out = DynamicExpectations::default();
        for (name, min, max) in entries {
            let (base, step) = split_variable_name(name);
            let step = step.ok_or_else(|| CredalError::MalformedDynamicNetwork {
                name: name.to_string(),
                reason: "has no time step suffix".to_string(),
            })?;
            let step: usize = step.parse().map_err(|_| CredalError::MalformedDynamicNetwork {
                name: name.to_string(),
                reason: format!("has non-integer time step {step:?}"),
            })?;
            if step >= step_limit {
                return Err(CredalError::MalformedDynamicNetwork {
                    name: name.to_string(),
                    reason: format!("has time step {step} beyond the network size {step_limit}"),
                });
            }
            place(&mut out.min, base, step, min);
            place(&mut out.max, base, step, max);
        }
        Ok(out)
    }

    pub fn min(&self, base: &str) -> Option<&[f64]> {
        self.min.get(base).map(Vec::as_slice)
    }

    pub fn max(&self, base: &str) -> Option<&[f64]> {
        self.max.get(base).map(Vec::as_slice)
    }
}

fn place(table: &mut BTreeMap<String, Vec<f64>>, base: &str, step: usize, value: f64) {
    let series = table.entry(base.to_string()).or_default();
    if series.len() <= step {
        series.resize(step + 1, f64::NAN);
    }
    series[step] = value;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::network::NetworkSpec;

    #[test]
    fn test_split_variable_name() {
        assert_eq!(split_variable_name("rain_12"), ("rain", Some("12")));
        assert_eq!(split_variable_name("a_b_c"), ("a", Some("b_c")));
        assert_eq!(split_variable_name("plain"), ("plain", None));
        assert_eq!(base_name("X_0"), "X");
        assert_eq!(base_name("X"), "X");
    }

    #[test]
    fn test_single_chain_clusters_under_t0() {
        let net = NetworkSpec::new()
            .with_variable("X_0", 2, &[])
            .and_then(|n| n.with_variable("X_1", 2, &[]))
            .and_then(|n| n.with_variable("X_2", 2, &[]))
            .unwrap();
        let clusters = DynamicClusterBuilder::build(&net).unwrap();
        assert_eq!(clusters.t0.get(&0), Some(&vec![1, 2]));
        assert!(clusters.t1.is_empty());
        assert_eq!(clusters.time_steps, 2);
        assert_eq!(clusters.clustered_nodes(), 3);
    }

    #[test]
    fn test_transition_slice_anchors_t1() {
        // X_1 has a parent so its table differs from X_0; X_2 repeats X_1.
        let net = NetworkSpec::new()
            .with_variable("X_0", 2, &[])
            .and_then(|n| n.with_variable("X_1", 2, &["X_0"]))
            .and_then(|n| n.with_variable("X_2", 2, &["X_1"]))
            .and_then(|n| n.with_variable("X_3", 2, &["X_2"]))
            .unwrap();
        let clusters = DynamicClusterBuilder::build(&net).unwrap();
        assert_eq!(clusters.t0.get(&0), Some(&vec![]));
        assert_eq!(clusters.t1.get(&1), Some(&vec![2, 3]));
        assert_eq!(clusters.time_steps, 3);
    }

    #[test]
    fn test_unmatched_node_left_out() {
        let net = NetworkSpec::new()
            .with_variable("X_0", 2, &[])
            .and_then(|n| n.with_variable("Y_4", 3, &[]))
            .unwrap();
        let clusters = DynamicClusterBuilder::build(&net).unwrap();
        assert_eq!(clusters.t0.get(&0), Some(&vec![]));
        assert_eq!(clusters.clustered_nodes(), 1);
        assert_eq!(clusters.time_steps, 4);
    }

    #[test]
    fn test_missing_suffix_is_malformed() {
        let net = NetworkSpec::new()
            .with_variable("X_0", 2, &[])
            .and_then(|n| n.with_variable("Rain", 2, &[]))
            .unwrap();
        let err = DynamicClusterBuilder::build(&net).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("Rain"));
    }

    #[test]
    fn test_non_integer_step_is_malformed() {
        let net = NetworkSpec::new()
            .with_variable("X_0", 2, &[])
            .and_then(|n| n.with_variable("X_next", 2, &[]))
            .unwrap();
        let err = DynamicClusterBuilder::build(&net).unwrap_err();
        assert!(matches!(err, CredalError::MalformedDynamicNetwork { ref name, .. } if name == "X_next"));
    }

    #[test]
    fn test_aggregate_fills_gaps_with_nan() {
        let agg = DynamicExpectations::aggregate(
            [("X_0", 1.0, 2.0), ("X_2", 3.0, 4.0), ("Y_1", 5.0, 6.0)],
            3,
        )
        .unwrap();
        let min = agg.min("X").unwrap();
        assert_eq!(min.len(), 3);
        assert_eq!(min[0], 1.0);
        assert!(min[1].is_nan());
        assert_eq!(min[2], 3.0);
        assert_eq!(agg.max("Y").unwrap()[1], 6.0);
        assert!(agg.min("Z").is_none());
    }

    #[test]
    fn test_aggregate_rejects_plain_names() {
        assert!(DynamicExpectations::aggregate([("X", 1.0, 2.0)], 1).is_err());
    }

    #[test]
    fn test_aggregate_rejects_steps_beyond_limit() {
        let err = DynamicExpectations::aggregate(
            [("X_0", 1.0, 2.0), ("X_18446744073709551615", 3.0, 4.0)],
            2,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CredalError::MalformedDynamicNetwork { ref name, .. } if name == "X_18446744073709551615"
        ));

        let err = DynamicExpectations::aggregate([("X_4000000000", 0.0, 1.0)], 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("X_4000000000"));
    }
}
