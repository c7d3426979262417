//! Error types for the benchmark harness.

use std::path::PathBuf;

use streamclust_core::ClusterError;
use thiserror::Error;

/// Errors raised while reading or generating a dataset.
///
/// A malformed input is always rejected as a whole; the loader never
/// returns a silently shortened dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    #[error("Malformed point on line {line}: {message}")]
    MalformedLine { line: usize, message: String },

    #[error("Dataset truncated: header declares {expected} points, found {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Invalid generator config: {0}")]
    InvalidConfig(String),
}

impl DatasetError {
    pub(crate) fn malformed_line(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedLine {
            line,
            message: message.into(),
        }
    }
}

/// Errors raised by a benchmark run.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for benchmark operations.
pub type BenchResult<T> = Result<T, BenchError>;
