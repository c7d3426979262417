//! Error types for streamclust-core.
//!
//! The summary structures themselves never fail once built: capacity
//! overflow, expiry and eviction are structural policies, not errors.
//! Fallibility lives at the edges: parameter validation, configuration
//! loading and point construction.

use thiserror::Error;

/// Errors raised while building or configuring a clustering structure.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Invalid parameter provided.
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// Description of what's wrong with the parameter
        message: String,
    },

    /// Point dimension doesn't match the structure's dimension.
    #[error("Dimension mismatch: expected {expected}, actual {actual}")]
    DimensionMismatch {
        /// Dimension the structure was built for
        expected: usize,
        /// Dimension of the offending point
        actual: usize,
    },

    /// A feature value is NaN or infinite.
    #[error("Non-finite feature value at index {index}: {value}")]
    NonFiniteValue {
        /// Position of the offending coordinate
        index: usize,
        /// The offending value
        value: f64,
    },

    /// Configuration could not be loaded or parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClusterError {
    /// Create an InvalidParameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }
}

impl From<config::ConfigError> for ClusterError {
    fn from(err: config::ConfigError) -> Self {
        ClusterError::Config(err.to_string())
    }
}

impl From<toml::de::Error> for ClusterError {
    fn from(err: toml::de::Error) -> Self {
        ClusterError::Config(format!("Failed to parse config file: {}", err))
    }
}

/// Result type alias for clustering operations.
pub type ClusterResult<T> = Result<T, ClusterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_variants_display() {
        let errors: Vec<ClusterError> = vec![
            ClusterError::invalid_parameter("threshold must be > 0.0"),
            ClusterError::dimension_mismatch(3, 2),
            ClusterError::NonFiniteValue {
                index: 1,
                value: f64::NAN,
            },
            ClusterError::Config("missing file".into()),
        ];

        let expected_substrings = ["threshold", "expected 3", "index 1", "missing file"];

        for (err, expected) in errors.iter().zip(expected_substrings.iter()) {
            let display = err.to_string();
            assert!(
                display.contains(expected),
                "Display for {:?} should contain '{}', got: {}",
                err,
                expected,
                display
            );
        }

        println!("[PASS] test_error_variants_display - all variants render their fields");
    }

    #[test]
    fn test_toml_error_maps_to_config() {
        let parse: Result<toml::Value, _> = toml::from_str("not = [valid");
        let err: ClusterError = parse.unwrap_err().into();
        assert!(matches!(err, ClusterError::Config(_)));
        println!("[PASS] test_toml_error_maps_to_config");
    }
}
