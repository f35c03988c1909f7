//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::engine::EngineConfig;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Validate engine configuration semantically.
pub fn validate_config(config: &EngineConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    let approx = &config.approximation;

    if let Some(eps) = approx.epsilon {
        if !eps.is_finite() || eps <= 0.0 {
            return Err(invalid(
                "approximation.epsilon",
                format!("must be finite and > 0, got {eps}"),
            ));
        }
    }

    if let Some(rate) = approx.min_epsilon_rate {
        if !rate.is_finite() || rate < 0.0 {
            return Err(invalid(
                "approximation.min_epsilon_rate",
                format!("must be finite and >= 0, got {rate}"),
            ));
        }
    }

    if approx.max_iterations == Some(0) {
        return Err(invalid("approximation.max_iterations", "must be >= 1"));
    }

    if let Some(secs) = approx.max_time_secs {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(invalid(
                "approximation.max_time_secs",
                format!("must be finite and > 0, got {secs}"),
            ));
        }
    }

    if approx.period_size == 0 {
        return Err(invalid("approximation.period_size", "must be >= 1"));
    }

    if !approx.has_stopping_criterion() {
        return Err(ValidationError::SemanticError(
            "at least one stopping criterion must be enabled".to_string(),
        ));
    }

    if config.vertices.eliminate_redundant && !config.vertices.store {
        return Err(ValidationError::SemanticError(
            "vertices.eliminate_redundant requires vertices.store".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ApproximationSettings;

    #[test]
    fn test_default_config_is_valid() {
        validate_config(&EngineConfig::default()).unwrap();
    }

    #[test]
    fn test_rejects_non_positive_epsilon() {
        let mut config = EngineConfig::default();
        config.approximation.epsilon = Some(0.0);
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { ref field, .. } if field == "approximation.epsilon"));
        assert_eq!(err.code(), 65);
    }

    #[test]
    fn test_rejects_zero_period() {
        let mut config = EngineConfig::default();
        config.approximation.period_size = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_no_stopping_criterion() {
        let config = EngineConfig {
            approximation: ApproximationSettings {
                epsilon: None,
                min_epsilon_rate: None,
                max_iterations: None,
                max_time_secs: None,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ValidationError::SemanticError(_)));
    }

    #[test]
    fn test_rejects_reduction_without_storage() {
        let mut config = EngineConfig::default();
        config.vertices.eliminate_redundant = true;
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::SemanticError(_))
        ));
    }

    #[test]
    fn test_rejects_version_mismatch() {
        let config = EngineConfig {
            schema_version: "0.9.0".to_string(),
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert_eq!(err.code(), 66);
    }
}
