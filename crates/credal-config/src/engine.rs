//! Engine configuration (engine.json).
//!
//! Every section is optional in the JSON file; missing sections and fields
//! fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::validate::ValidationError;
use crate::CONFIG_SCHEMA_VERSION;

fn default_schema_version() -> String {
    CONFIG_SCHEMA_VERSION.to_string()
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Schema version of this file.
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Stopping policy for the iteration loop.
    #[serde(default)]
    pub approximation: ApproximationSettings,

    /// Worker pool used for epsilon computation.
    #[serde(default)]
    pub threads: ThreadSettings,

    /// Vertex storage options.
    #[serde(default)]
    pub vertices: VertexSettings,

    /// Time-sliced network options.
    #[serde(default)]
    pub dynamic: DynamicSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            approximation: ApproximationSettings::default(),
            threads: ThreadSettings::default(),
            vertices: VertexSettings::default(),
            dynamic: DynamicSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a JSON string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }
}

/// Stopping criteria. A `None` criterion is disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproximationSettings {
    /// Stop once epsilon falls to or below this value.
    #[serde(default = "default_epsilon")]
    pub epsilon: Option<f64>,

    /// Stop once the relative change of epsilon between two checks falls
    /// below this value.
    #[serde(default = "default_min_epsilon_rate")]
    pub min_epsilon_rate: Option<f64>,

    /// Stop after this many iterations.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: Option<u64>,

    /// Stop after this many seconds of wall time.
    #[serde(default)]
    pub max_time_secs: Option<f64>,

    /// Criteria are checked every `period_size` iterations.
    #[serde(default = "default_period_size")]
    pub period_size: u64,

    /// Iterations run before any criterion is checked.
    #[serde(default)]
    pub burn_in: u64,

    /// Keep the epsilon of every check.
    #[serde(default)]
    pub record_history: bool,
}

fn default_epsilon() -> Option<f64> {
    Some(1e-2)
}

fn default_min_epsilon_rate() -> Option<f64> {
    Some(1e-3)
}

fn default_max_iterations() -> Option<u64> {
    Some(10_000)
}

fn default_period_size() -> u64 {
    1
}

impl Default for ApproximationSettings {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            min_epsilon_rate: default_min_epsilon_rate(),
            max_iterations: default_max_iterations(),
            max_time_secs: None,
            period_size: default_period_size(),
            burn_in: 0,
            record_history: false,
        }
    }
}

impl ApproximationSettings {
    /// Wall-time budget, if any.
    pub fn max_time(&self) -> Option<Duration> {
        self.max_time_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    /// True when at least one criterion can end a run.
    pub fn has_stopping_criterion(&self) -> bool {
        self.epsilon.is_some()
            || self.min_epsilon_rate.is_some()
            || self.max_iterations.is_some()
            || self.max_time_secs.is_some()
    }
}

/// Worker pool settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThreadSettings {
    /// Number of workers; 0 selects the available parallelism.
    #[serde(default)]
    pub workers: usize,
}

impl ThreadSettings {
    /// Effective worker count (always at least 1).
    pub fn resolved_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

/// Vertex tracking settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VertexSettings {
    /// Track posterior credal set vertices.
    #[serde(default)]
    pub store: bool,

    /// Run hull redundancy elimination after each vertex insertion.
    #[serde(default)]
    pub eliminate_redundant: bool,
}

/// Dynamic network settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DynamicSettings {
    /// Build time-slice clusters at initialization.
    #[serde(default)]
    pub repetitive_independence: bool,
}
