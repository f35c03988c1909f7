//! Caller-owned inputs: evidence, queries and modal values.
//!
//! Insertion is best-effort. An entry that names an unknown variable, has
//! the wrong cardinality or carries an invalid value is skipped with a
//! [`SkipReason`]; the remaining entries still apply. Callers get one
//! [`InsertReport`] per bulk call.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::dynamic::base_name;
use crate::logging::event_names;
use crate::network::{CredalModel, NodeId};

/// Why an entry was not applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// No variable with this name.
    UnknownVariable,
    /// No node with this identifier.
    UnknownNode,
    /// Number of values differs from the variable's domain size.
    CardinalityMismatch { expected: usize, found: usize },
    /// A token could not be parsed.
    Unparsable { token: String },
    /// A value is negative, NaN or infinite.
    InvalidValue { index: usize },
    /// A query index is outside the variable's domain.
    ModalityOutOfRange { index: usize, domain_size: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnknownVariable => write!(f, "unknown variable"),
            SkipReason::UnknownNode => write!(f, "unknown node"),
            SkipReason::CardinalityMismatch { expected, found } => {
                write!(f, "expected {expected} values, found {found}")
            }
            SkipReason::Unparsable { token } => write!(f, "cannot parse {token:?}"),
            SkipReason::InvalidValue { index } => {
                write!(f, "value at modality {index} is negative or not finite")
            }
            SkipReason::ModalityOutOfRange { index, domain_size } => {
                write!(f, "modality {index} out of range (domain size {domain_size})")
            }
        }
    }
}

/// A skipped entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedEntry {
    /// Line number for text input.
    pub line: Option<usize>,
    pub variable: String,
    pub reason: SkipReason,
}

/// Outcome of a bulk insertion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InsertReport {
    /// Variables whose entry was applied, in input order.
    pub applied: Vec<String>,
    pub skipped: Vec<SkippedEntry>,
}

impl InsertReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    pub(crate) fn record(
        &mut self,
        kind: &'static str,
        variable: &str,
        line: Option<usize>,
        outcome: Result<(), SkipReason>,
    ) {
        match outcome {
            Ok(()) => self.applied.push(variable.to_string()),
            Err(reason) => {
                tracing::warn!(
                    target: "credal_core::store",
                    event = event_names::ENTRY_SKIPPED,
                    input = kind,
                    variable,
                    line = ?line,
                    reason = %reason,
                    "skipping {kind} entry"
                );
                self.skipped.push(SkippedEntry {
                    line,
                    variable: variable.to_string(),
                    reason,
                });
            }
        }
    }
}

fn checked_domain<N: CredalModel + ?Sized>(
    model: &N,
    node: NodeId,
    found: usize,
) -> Result<usize, SkipReason> {
    let expected = model.domain_size(node).ok_or(SkipReason::UnknownNode)?;
    if expected != found {
        return Err(SkipReason::CardinalityMismatch { expected, found });
    }
    Ok(expected)
}

fn check_values(values: &[f64]) -> Result<(), SkipReason> {
    match values.iter().position(|v| !v.is_finite() || *v < 0.0) {
        Some(index) => Err(SkipReason::InvalidValue { index }),
        None => Ok(()),
    }
}

/// Parse numeric tokens, reporting the first bad one.
pub(crate) fn parse_values(tokens: &[String]) -> Result<Vec<f64>, SkipReason> {
    tokens
        .iter()
        .map(|t| {
            t.parse::<f64>().map_err(|_| SkipReason::Unparsable { token: t.clone() })
        })
        .collect()
}

/// Parse modality index tokens.
pub(crate) fn parse_indices(tokens: &[String]) -> Result<Vec<usize>, SkipReason> {
    tokens
        .iter()
        .map(|t| {
            t.parse::<usize>().map_err(|_| SkipReason::Unparsable { token: t.clone() })
        })
        .collect()
}

/// Node → probability vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Evidence {
    entries: BTreeMap<NodeId, Vec<f64>>,
}

impl Evidence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store evidence for `node`, replacing any previous entry.
    pub fn set<N: CredalModel + ?Sized>(
        &mut self,
        model: &N,
        node: NodeId,
        values: Vec<f64>,
    ) -> Result<(), SkipReason> {
        checked_domain(model, node, values.len())?;
        check_values(&values)?;
        self.entries.insert(node, values);
        Ok(())
    }

    pub fn get(&self, node: NodeId) -> Option<&[f64]> {
        self.entries.get(&node).map(Vec::as_slice)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.entries.contains_key(&node)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &[f64])> {
        self.entries.iter().map(|(&n, v)| (n, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Node → modalities of interest. Advisory only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Queries {
    entries: BTreeMap<NodeId, Vec<bool>>,
}

impl Queries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a full mask for `node`, replacing any previous entry.
    pub fn set<N: CredalModel + ?Sized>(
        &mut self,
        model: &N,
        node: NodeId,
        mask: Vec<bool>,
    ) -> Result<(), SkipReason> {
        checked_domain(model, node, mask.len())?;
        self.entries.insert(node, mask);
        Ok(())
    }

    /// Mark modalities by index; an empty list marks every modality.
    /// Marks accumulate with earlier entries for the same node.
    pub fn mark<N: CredalModel + ?Sized>(
        &mut self,
        model: &N,
        node: NodeId,
        indices: &[usize],
    ) -> Result<(), SkipReason> {
        let domain_size = model.domain_size(node).ok_or(SkipReason::UnknownNode)?;
        if let Some(&index) = indices.iter().find(|&&i| i >= domain_size) {
            return Err(SkipReason::ModalityOutOfRange { index, domain_size });
        }

        let mask = self
            .entries
            .entry(node)
            .or_insert_with(|| vec![false; domain_size]);
        if indices.is_empty() {
            mask.iter_mut().for_each(|m| *m = true);
        } else {
            for &i in indices {
                mask[i] = true;
            }
        }
        Ok(())
    }

    pub fn get(&self, node: NodeId) -> Option<&[bool]> {
        self.entries.get(&node).map(Vec::as_slice)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.entries.contains_key(&node)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &[bool])> {
        self.entries.iter().map(|(&n, v)| (n, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Variable base-name → per-modality weights.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModalTable {
    entries: BTreeMap<String, Vec<f64>>,
}

impl ModalTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store weights under the base-name of `name`. Every node sharing that
    /// base-name must have `values.len()` modalities.
    pub fn set<N: CredalModel + ?Sized>(
        &mut self,
        model: &N,
        name: &str,
        values: Vec<f64>,
    ) -> Result<(), SkipReason> {
        let base = base_name(name);
        let mut matched = false;
        for node in model.nodes() {
            let Some(var) = model.variable_name(node) else {
                continue;
            };
            if base_name(var) != base {
                continue;
            }
            matched = true;
            checked_domain(model, node, values.len())?;
        }
        if !matched {
            return Err(SkipReason::UnknownVariable);
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(SkipReason::InvalidValue { index });
        }

        self.entries.insert(base.to_string(), values);
        Ok(())
    }

    /// Weights keyed by base-name.
    pub fn get(&self, base: &str) -> Option<&[f64]> {
        self.entries.get(base).map(Vec::as_slice)
    }

    /// Weights for a full variable name (looked up by its base-name).
    pub fn for_variable(&self, name: &str) -> Option<&[f64]> {
        self.get(base_name(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
