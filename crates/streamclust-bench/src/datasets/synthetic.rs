//! Synthetic dataset generation.
//!
//! Two modes, chosen by `num_clusters`:
//! - 0: unlabeled points uniform in `[0, extent)^dim`, timestamps 0..n
//! - k > 0: Gaussian blobs around k random centers inside the same box,
//!   labeled 1..=k, timestamps 1..=n
//!
//! All randomness comes from a seeded `ChaCha8Rng`.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use streamclust_core::Point;

use super::Dataset;
use crate::error::DatasetError;

/// Configuration for synthetic dataset generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticDatasetConfig {
    /// Total number of points.
    pub num_points: usize,

    /// Dimensionality.
    pub dim: usize,

    /// Number of Gaussian blobs; 0 for uniform noise.
    pub num_clusters: usize,

    /// Standard deviation of each blob along every axis.
    pub cluster_std: f64,

    /// Side length of the sampling box.
    pub extent: f64,

    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for SyntheticDatasetConfig {
    fn default() -> Self {
        Self {
            num_points: 100_000,
            dim: 3,
            num_clusters: 0,
            cluster_std: 1.0,
            extent: 100.0,
            seed: 42,
        }
    }
}

impl SyntheticDatasetConfig {
    fn validate(&self) -> Result<(), DatasetError> {
        if self.dim == 0 {
            return Err(DatasetError::InvalidConfig("dim must be greater than 0".into()));
        }
        if !(self.extent.is_finite() && self.extent > 0.0) {
            return Err(DatasetError::InvalidConfig(format!(
                "extent must be positive and finite, got {}",
                self.extent
            )));
        }
        if self.num_clusters > 0 && !(self.cluster_std.is_finite() && self.cluster_std > 0.0) {
            return Err(DatasetError::InvalidConfig(format!(
                "cluster_std must be positive and finite, got {}",
                self.cluster_std
            )));
        }
        Ok(())
    }
}

/// Generator for synthetic point streams.
pub struct SyntheticDatasetGenerator {
    config: SyntheticDatasetConfig,
    rng: ChaCha8Rng,
}

impl SyntheticDatasetGenerator {
    /// Create a new generator.
    pub fn new(config: SyntheticDatasetConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    /// Generate the dataset.
    pub fn generate(&mut self) -> Result<Dataset, DatasetError> {
        self.config.validate()?;
        if self.config.num_clusters == 0 {
            Ok(self.generate_uniform())
        } else {
            self.generate_blobs()
        }
    }

    /// Blob centers are drawn first, so this is stable for a given seed.
    fn generate_blobs(&mut self) -> Result<Dataset, DatasetError> {
        let SyntheticDatasetConfig {
            num_points,
            dim,
            num_clusters,
            cluster_std,
            extent,
            ..
        } = self.config;

        let normal = Normal::new(0.0, cluster_std)
            .map_err(|e| DatasetError::InvalidConfig(format!("cluster_std: {}", e)))?;

        let centers: Vec<Vec<f64>> = (0..num_clusters)
            .map(|_| (0..dim).map(|_| self.rng.gen_range(0.0..extent)).collect())
            .collect();

        let mut points = Vec::with_capacity(num_points);
        for i in 0..num_points {
            let c = self.rng.gen_range(0..num_clusters);
            let features = centers[c]
                .iter()
                .map(|x| x + normal.sample(&mut self.rng))
                .collect();
            points.push(Point::new(features, i as u64 + 1).with_label(c as u64 + 1));
        }

        Ok(Dataset {
            name: format!("blobs-k{}-n{}-d{}", num_clusters, num_points, dim),
            num_points,
            dim,
            num_true_clusters: num_clusters,
            points,
        })
    }

    fn generate_uniform(&mut self) -> Dataset {
        let SyntheticDatasetConfig {
            num_points,
            dim,
            extent,
            ..
        } = self.config;

        let points = (0..num_points)
            .map(|i| {
                let features = (0..dim).map(|_| self.rng.gen_range(0.0..extent)).collect();
                Point::new(features, i as u64)
            })
            .collect();

        Dataset {
            name: format!("uniform-n{}-d{}", num_points, dim),
            num_points,
            dim,
            num_true_clusters: 0,
            points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(num_clusters: usize) -> SyntheticDatasetConfig {
        SyntheticDatasetConfig {
            num_points: 500,
            dim: 2,
            num_clusters,
            seed: 7,
            ..Default::default()
        }
    }

    #[test]
    fn test_uniform_mode() {
        let ds = SyntheticDatasetGenerator::new(config(0)).generate().unwrap();
        assert_eq!(ds.points.len(), 500);
        assert_eq!(ds.num_true_clusters, 0);
        assert_eq!(ds.points[0].timestamp, 0);
        assert!(ds.points.iter().all(|p| p.label.is_none()));
        assert!(ds
            .points
            .iter()
            .all(|p| p.features.iter().all(|&x| (0.0..100.0).contains(&x))));
        println!("[PASS] test_uniform_mode");
    }

    #[test]
    fn test_blob_labels_in_range() {
        let ds = SyntheticDatasetGenerator::new(config(4)).generate().unwrap();
        assert_eq!(ds.num_true_clusters, 4);
        assert_eq!(ds.points[0].timestamp, 1);
        assert!(ds
            .points
            .iter()
            .all(|p| matches!(p.label, Some(l) if (1..=4).contains(&l))));
        println!("[PASS] test_blob_labels_in_range");
    }

    #[test]
    fn test_same_seed_same_dataset() {
        let a = SyntheticDatasetGenerator::new(config(3)).generate().unwrap();
        let b = SyntheticDatasetGenerator::new(config(3)).generate().unwrap();
        assert_eq!(a, b);

        let mut other = config(3);
        other.seed = 8;
        let c = SyntheticDatasetGenerator::new(other).generate().unwrap();
        assert_ne!(a.points, c.points);
        println!("[PASS] test_same_seed_same_dataset");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut bad = config(2);
        bad.cluster_std = 0.0;
        assert!(SyntheticDatasetGenerator::new(bad).generate().is_err());

        let mut bad = config(0);
        bad.dim = 0;
        assert!(matches!(
            SyntheticDatasetGenerator::new(bad).generate(),
            Err(DatasetError::InvalidConfig(_))
        ));
        println!("[PASS] test_invalid_config_rejected");
    }
}
