//! Credal engine configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for engine.json
//! - Config resolution (explicit path → env → XDG → system → defaults)
//! - Semantic validation of stopping criteria and worker settings

pub mod engine;
pub mod resolve;
pub mod validate;

pub use engine::{
    ApproximationSettings, DynamicSettings, EngineConfig, ThreadSettings, VertexSettings,
};
pub use resolve::{load_config, resolve_config, ConfigPath, ConfigSource, ResolvedConfig};
pub use validate::{validate_config, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
