//! Engine error taxonomy.
//!
//! Fatal conditions are returned as [`CredalError`]. Recoverable problems
//! with individual evidence, query or modal entries never surface here; they
//! are collected in [`crate::store::InsertReport`].

use std::path::PathBuf;
use thiserror::Error;

use crate::network::NodeId;

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, CredalError>;

/// Coarse classification of [`CredalError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown variable, node or monitored variable on read access.
    NotFound,
    /// Operation requested in a state that does not allow it.
    OperationNotAllowed,
    /// Input that makes the requested computation impossible.
    InvalidArgument,
    /// Unreadable input file or failing writer.
    Io,
    /// Failure reported by the propagation strategy.
    Propagation,
    /// Worker pool could not be created.
    Resource,
}

/// Errors from the inference engine.
#[derive(Debug, Error)]
pub enum CredalError {
    #[error("unknown variable: {name}")]
    UnknownVariable { name: String },

    #[error("unknown node id: {0}")]
    UnknownNode(NodeId),

    #[error("variable {name} is not monitored (no modal values)")]
    UnknownMonitoredVariable { name: String },

    #[error("duplicate variable name: {name}")]
    DuplicateVariable { name: String },

    #[error("invalid network description: {message}")]
    InvalidNetwork { message: String },

    #[error("invalid engine configuration: {0}")]
    Config(#[from] credal_config::ValidationError),

    #[error("sample for node {node} has {found} values, expected {expected}")]
    DimensionMismatch {
        node: NodeId,
        expected: usize,
        found: usize,
    },

    #[error("dynamic expectations have not been computed yet")]
    DynamicExpectationsNotComputed,

    #[error("cannot open {path} for writing: {source}")]
    OutputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read {path}: {source}")]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed dynamic network: variable {name} {reason}")]
    MalformedDynamicNetwork { name: String, reason: String },

    #[error("propagation strategy {strategy} failed: {message}")]
    Propagation { strategy: String, message: String },

    #[error("worker pool unavailable: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl CredalError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CredalError::UnknownVariable { .. }
            | CredalError::UnknownNode(_)
            | CredalError::UnknownMonitoredVariable { .. } => ErrorKind::NotFound,
            CredalError::DynamicExpectationsNotComputed
            | CredalError::OutputUnavailable { .. } => ErrorKind::OperationNotAllowed,
            CredalError::DuplicateVariable { .. }
            | CredalError::InvalidNetwork { .. }
            | CredalError::Config(_)
            | CredalError::DimensionMismatch { .. }
            | CredalError::MalformedDynamicNetwork { .. } => ErrorKind::InvalidArgument,
            CredalError::InputUnavailable { .. } | CredalError::Io(_) => ErrorKind::Io,
            CredalError::Propagation { .. } => ErrorKind::Propagation,
            CredalError::ThreadPool(_) => ErrorKind::Resource,
        }
    }

    /// Shorthand for strategies reporting a failure.
    pub fn propagation(strategy: impl Into<String>, message: impl Into<String>) -> Self {
        CredalError::Propagation {
            strategy: strategy.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            CredalError::UnknownVariable { name: "A".into() }.kind(),
            ErrorKind::NotFound
        );
        assert_eq!(CredalError::UnknownNode(3).kind(), ErrorKind::NotFound);
        assert_eq!(
            CredalError::DynamicExpectationsNotComputed.kind(),
            ErrorKind::OperationNotAllowed
        );
        assert_eq!(
            CredalError::MalformedDynamicNetwork {
                name: "X".into(),
                reason: "has no time step".into()
            }
            .kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            CredalError::propagation("lbp", "diverged").kind(),
            ErrorKind::Propagation
        );
    }

    #[test]
    fn test_messages_name_offender() {
        let err = CredalError::OutputUnavailable {
            path: PathBuf::from("/nope/marginals.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("/nope/marginals.txt"));

        let err = CredalError::MalformedDynamicNetwork {
            name: "rain".into(),
            reason: "has no time step suffix".into(),
        };
        assert!(err.to_string().contains("rain"));
    }
}
