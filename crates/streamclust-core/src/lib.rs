//! Streaming Clustering Core Library
//!
//! Bounded-memory summary structures that consume an unbounded, timestamp
//! ordered stream of points and keep a compact picture of its cluster
//! structure, queryable at any time as a set of centers.
//!
//! # Architecture
//!
//! This crate defines:
//! - The point model (`Point`) and clustering features (`ClusteringFeature`)
//! - Six maintainers under [`clustering`], one per summarization strategy
//! - The `StreamClusterer` contract and the closed `Algorithm` variant
//! - Configuration (`StreamClusterConfig`) and error types
//!
//! Everything is single-threaded and synchronous: `cluster()` processes a
//! batch point by point, in order, before returning.
//!
//! # Example
//!
//! ```
//! use streamclust_core::clustering::{CfTree, CfTreeParams};
//! use streamclust_core::{Point, StreamClusterer};
//!
//! let mut tree = CfTree::new(CfTreeParams::default().with_threshold(2.0), 2).unwrap();
//! tree.cluster(&[
//!     Point::new(vec![0.0, 0.0], 1),
//!     Point::new(vec![1.0, 1.0], 2),
//!     Point::new(vec![50.0, 50.0], 3),
//! ]);
//! assert_eq!(tree.output_centers().len(), 2);
//! ```

pub mod algorithm;
pub mod clustering;
pub mod config;
pub mod error;
pub mod point;

// Re-exports for convenience
pub use algorithm::{Algorithm, AlgorithmKind, StreamClusterer};
pub use clustering::ClusteringFeature;
pub use config::{HarnessConfig, LogFormat, LoggingConfig, StreamClusterConfig};
pub use error::{ClusterError, ClusterResult};
pub use point::{euclidean_distance, Point};
