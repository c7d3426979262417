//! Datasets for stream clustering benchmarks.
//!
//! A dataset is a named, fixed-dimension point stream with the number of
//! ground-truth clusters its labels range over. Points are stored in
//! stream order; the runner feeds them to each algorithm unchanged.

pub mod loader;
pub mod synthetic;

use serde::{Deserialize, Serialize};
use streamclust_core::Point;

pub use loader::{load_dataset, parse_dataset};
pub use synthetic::{SyntheticDatasetConfig, SyntheticDatasetGenerator};

/// A point stream with its header metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub num_points: usize,
    pub dim: usize,
    /// Ground-truth labels range over 1..=num_true_clusters; 0 if unlabeled.
    pub num_true_clusters: usize,
    pub points: Vec<Point>,
}

impl Dataset {
    /// Keep only the first `n` points.
    pub fn limit(&mut self, n: usize) {
        if n < self.points.len() {
            self.points.truncate(n);
            self.num_points = n;
        }
    }

    /// Header metadata without the points.
    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            name: self.name.clone(),
            num_points: self.num_points,
            dim: self.dim,
            num_true_clusters: self.num_true_clusters,
        }
    }
}

/// Dataset metadata as it appears in reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub name: String,
    pub num_points: usize,
    pub dim: usize,
    pub num_true_clusters: usize,
}

impl std::fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Dataset {}: {} points, {} dimensions, {} true clusters",
            self.name, self.num_points, self.dim, self.num_true_clusters
        )
    }
}
