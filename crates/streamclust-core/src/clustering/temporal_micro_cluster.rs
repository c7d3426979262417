//! Micro-clusters with hard per-cluster age pruning.
//!
//! Before each insertion every cluster created more than `time_window` ticks
//! ago is dropped. The point then joins the nearest surviving cluster if it
//! lies within `epsilon`, otherwise it seeds a new one. Only clusters whose
//! weight reached `min_points` are reported as centers; lighter ones stay as
//! summaries until they grow or age out.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::algorithm::StreamClusterer;
use crate::clustering::feature::{closest_feature, ClusteringFeature};
use crate::error::{ClusterError, ClusterResult};
use crate::point::Point;

/// Parameters for [`TemporalMicroClusterSet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalMicroClusterParams {
    /// Maximum age (now - creation_time) before a cluster is pruned.
    pub time_window: u64,
    /// Absorption radius (strict).
    pub epsilon: f64,
    /// Minimum weight for a cluster to be reported.
    pub min_points: u64,
}

impl Default for TemporalMicroClusterParams {
    fn default() -> Self {
        Self {
            time_window: 1000,
            epsilon: 1.0,
            min_points: 5,
        }
    }
}

impl TemporalMicroClusterParams {
    /// Set time window.
    #[must_use]
    pub fn with_time_window(mut self, time_window: u64) -> Self {
        self.time_window = time_window;
        self
    }

    /// Set absorption radius.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set reporting weight.
    #[must_use]
    pub fn with_min_points(mut self, min_points: u64) -> Self {
        self.min_points = min_points;
        self
    }

    /// Validate parameters.
    ///
    /// # Errors
    ///
    /// Returns `ClusterError::InvalidParameter` if epsilon is not a positive
    /// finite number.
    pub fn validate(&self) -> ClusterResult<()> {
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(ClusterError::invalid_parameter(format!(
                "temporal_micro_cluster.epsilon must be > 0.0 and finite, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// Micro-cluster tracking its absorbed weight and creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedMicroCluster {
    /// Sufficient statistics of absorbed points.
    pub cf: ClusteringFeature,
    /// Number of absorbed points.
    pub weight: u64,
    /// Timestamp of the point that created this cluster.
    pub creation_time: u64,
}

/// Age-pruned set of weighted micro-clusters.
#[derive(Debug, Clone)]
pub struct TemporalMicroClusterSet {
    params: TemporalMicroClusterParams,
    dimension: usize,
    clusters: Vec<WeightedMicroCluster>,
    pruned_count: u64,
}

impl TemporalMicroClusterSet {
    /// Create an empty set.
    ///
    /// # Errors
    ///
    /// Returns `ClusterError::InvalidParameter` if dimension is 0 or the
    /// params are invalid.
    pub fn new(params: TemporalMicroClusterParams, dimension: usize) -> ClusterResult<Self> {
        if dimension == 0 {
            return Err(ClusterError::invalid_parameter("dimension must be > 0"));
        }
        params.validate()?;
        Ok(Self {
            params,
            dimension,
            clusters: Vec::new(),
            pruned_count: 0,
        })
    }

    /// Retained clusters, reported or not.
    pub fn clusters(&self) -> &[WeightedMicroCluster] {
        &self.clusters
    }

    /// Number of clusters removed by age pruning so far.
    pub fn pruned_count(&self) -> u64 {
        self.pruned_count
    }

    /// Prune aged clusters, then absorb or seed.
    pub fn insert(&mut self, point: &Point) {
        debug_assert_eq!(point.dimension(), self.dimension, "point dimension mismatch");

        let now = point.timestamp;
        let window = self.params.time_window;
        let before = self.clusters.len();
        self.clusters
            .retain(|c| now.saturating_sub(c.creation_time) <= window);
        let pruned = before - self.clusters.len();
        if pruned > 0 {
            self.pruned_count += pruned as u64;
            debug!(now, pruned, retained = self.clusters.len(), "Pruned aged micro-clusters");
        }

        let closest = closest_feature(self.clusters.iter().map(|c| &c.cf), &point.features);
        match closest {
            Some((idx, dist)) if dist < self.params.epsilon => {
                let cluster = &mut self.clusters[idx];
                cluster.cf.add_point(&point.features);
                cluster.weight += 1;
            }
            _ => self.clusters.push(WeightedMicroCluster {
                cf: ClusteringFeature::from_point(&point.features),
                weight: 1,
                creation_time: now,
            }),
        }
    }
}

impl StreamClusterer for TemporalMicroClusterSet {
    fn name(&self) -> &'static str {
        "temporal-micro-cluster"
    }

    fn insert(&mut self, point: &Point) {
        TemporalMicroClusterSet::insert(self, point);
    }

    /// Mean of every cluster whose weight reached `min_points`.
    fn output_centers(&self) -> Vec<Point> {
        self.clusters
            .iter()
            .filter(|c| c.weight >= self.params.min_points)
            .map(|c| c.cf.center())
            .collect()
    }

    fn summary_len(&self) -> usize {
        self.clusters.len()
    }
}
