//! Clustering quality metrics.

pub mod purity;

pub use purity::{evaluate_purity, group_by_centers, PurityReport};
