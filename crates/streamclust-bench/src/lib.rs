//! Benchmark harness for the streamclust summary structures.
//!
//! Provides the pieces around the core that a full benchmark run needs:
//! - Dataset loading from the line-oriented text format and synthetic
//!   generation (`datasets`)
//! - Purity evaluation against ground-truth labels (`metrics`)
//! - A batched runner that times each algorithm, persists its centers and
//!   aggregates a JSON report (`runners`)
//!
//! The `stream-bench` binary wires these together behind a CLI.

pub mod datasets;
pub mod error;
pub mod metrics;
pub mod runners;
pub mod util;

pub use datasets::Dataset;
pub use error::{BenchError, BenchResult, DatasetError};
