//! Network model boundary.
//!
//! The engine never owns or mutates the network. It only needs node
//! identifiers, domain sizes, variable names and conditional-table sizes,
//! which [`CredalModel`] exposes. [`NetworkSpec`] is a small in-memory model
//! for embedding and tests.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{CredalError, Result};

/// Node identifier.
pub type NodeId = usize;

/// Read-only view of a credal network.
pub trait CredalModel: Sync {
    /// All node identifiers in ascending order.
    fn nodes(&self) -> Vec<NodeId>;

    /// Number of modalities of `node`.
    fn domain_size(&self, node: NodeId) -> Option<usize>;

    /// Variable name of `node`.
    fn variable_name(&self, node: NodeId) -> Option<&str>;

    /// Look a node up by variable name.
    fn node_id(&self, name: &str) -> Option<NodeId>;

    /// Number of entries in the conditional table of `node` (its domain
    /// size times the product of its parents' domain sizes).
    fn table_dimension(&self, node: NodeId) -> Option<usize>;

    /// Number of nodes.
    fn node_count(&self) -> usize {
        self.nodes().len()
    }
}

/// One variable of a [`NetworkSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSpec {
    pub name: String,
    pub domain_size: usize,
    #[serde(default)]
    pub parents: Vec<String>,
}

/// In-memory network structure. Node ids follow insertion order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkSpec {
    variables: Vec<VariableSpec>,
    #[serde(skip)]
    by_name: HashMap<String, NodeId>,
}

impl NetworkSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable whose parents were added before it.
    pub fn add_variable(
        &mut self,
        name: &str,
        domain_size: usize,
        parents: &[&str],
    ) -> Result<NodeId> {
        if self.by_name.contains_key(name) {
            return Err(CredalError::DuplicateVariable {
                name: name.to_string(),
            });
        }
        for parent in parents {
            if !self.by_name.contains_key(*parent) {
                return Err(CredalError::UnknownVariable {
                    name: parent.to_string(),
                });
            }
        }

        let id = self.variables.len();
        self.variables.push(VariableSpec {
            name: name.to_string(),
            domain_size,
            parents: parents.iter().map(|p| p.to_string()).collect(),
        });
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    /// Builder-style [`add_variable`](Self::add_variable).
    pub fn with_variable(mut self, name: &str, domain_size: usize, parents: &[&str]) -> Result<Self> {
        self.add_variable(name, domain_size, parents)?;
        Ok(self)
    }

    /// Parse a network description from JSON
    /// (`{"variables": [{"name": "A", "domain_size": 2, "parents": []}]}`).
    pub fn from_json(json: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct Raw {
            variables: Vec<VariableSpec>,
        }

        let raw: Raw = serde_json::from_str(json).map_err(|e| CredalError::InvalidNetwork {
            message: e.to_string(),
        })?;
        let mut spec = NetworkSpec::new();
        for var in raw.variables {
            let parents: Vec<&str> = var.parents.iter().map(String::as_str).collect();
            spec.add_variable(&var.name, var.domain_size, &parents)?;
        }
        Ok(spec)
    }

    pub fn variables(&self) -> &[VariableSpec] {
        &self.variables
    }
}

impl CredalModel for NetworkSpec {
    fn nodes(&self) -> Vec<NodeId> {
        (0..self.variables.len()).collect()
    }

    fn domain_size(&self, node: NodeId) -> Option<usize> {
        self.variables.get(node).map(|v| v.domain_size)
    }

    fn variable_name(&self, node: NodeId) -> Option<&str> {
        self.variables.get(node).map(|v| v.name.as_str())
    }

    fn node_id(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    fn table_dimension(&self, node: NodeId) -> Option<usize> {
        let var = self.variables.get(node)?;
        let mut dim = var.domain_size;
        for parent in &var.parents {
            let pid = self.node_id(parent)?;
            dim *= self.variables[pid].domain_size;
        }
        Some(dim)
    }

    fn node_count(&self) -> usize {
        self.variables.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_follow_insertion_order() {
        let mut net = NetworkSpec::new();
        assert_eq!(net.add_variable("A", 2, &[]).unwrap(), 0);
        assert_eq!(net.add_variable("B", 3, &["A"]).unwrap(), 1);
        assert_eq!(net.nodes(), vec![0, 1]);
        assert_eq!(net.node_id("B"), Some(1));
        assert_eq!(net.variable_name(0), Some("A"));
    }

    #[test]
    fn test_table_dimension_includes_parents() {
        let net = NetworkSpec::new()
            .with_variable("A", 2, &[])
            .and_then(|n| n.with_variable("B", 3, &[]))
            .and_then(|n| n.with_variable("C", 4, &["A", "B"]))
            .unwrap();
        assert_eq!(net.table_dimension(0), Some(2));
        assert_eq!(net.table_dimension(2), Some(24));
        assert_eq!(net.table_dimension(9), None);
    }

    #[test]
    fn test_rejects_duplicates_and_unknown_parents() {
        let mut net = NetworkSpec::new();
        net.add_variable("A", 2, &[]).unwrap();
        assert!(matches!(
            net.add_variable("A", 2, &[]),
            Err(CredalError::DuplicateVariable { .. })
        ));
        assert!(matches!(
            net.add_variable("B", 2, &["Z"]),
            Err(CredalError::UnknownVariable { .. })
        ));
    }

    #[test]
    fn test_from_json() {
        let net = NetworkSpec::from_json(
            r#"{"variables": [
                {"name": "rain_0", "domain_size": 2},
                {"name": "rain_1", "domain_size": 2, "parents": ["rain_0"]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(net.node_count(), 2);
        assert_eq!(net.table_dimension(1), Some(4));
    }
}
