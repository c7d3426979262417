//! Recency-windowed micro-clusters with capacity-triggered eviction.
//!
//! A new point only considers micro-clusters updated within the last
//! `time_window` ticks. If none of them is close enough, the point starts a
//! new micro-cluster. Once the pool exceeds `max_micro_clusters`, the single
//! globally least recently updated micro-cluster is dropped, whether or not
//! it is still inside the window.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::algorithm::StreamClusterer;
use crate::clustering::feature::ClusteringFeature;
use crate::error::{ClusterError, ClusterResult};
use crate::point::Point;

/// Parameters for [`MicroClusterWindow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MicroClusterWindowParams {
    /// Maximum age (now - last_update_time) for a cluster to accept points.
    pub time_window: u64,
    /// Absorption threshold on point-to-mean distance (strict).
    pub threshold: f64,
    /// Pool capacity; exceeding it evicts the oldest cluster.
    pub max_micro_clusters: usize,
}

impl Default for MicroClusterWindowParams {
    fn default() -> Self {
        Self {
            time_window: 1000,
            threshold: 1.0,
            max_micro_clusters: 100,
        }
    }
}

impl MicroClusterWindowParams {
    /// Set time window.
    #[must_use]
    pub fn with_time_window(mut self, time_window: u64) -> Self {
        self.time_window = time_window;
        self
    }

    /// Set absorption threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set pool capacity.
    #[must_use]
    pub fn with_max_micro_clusters(mut self, max: usize) -> Self {
        self.max_micro_clusters = max;
        self
    }

    /// Validate parameters.
    ///
    /// # Errors
    ///
    /// Returns `ClusterError::InvalidParameter` if the threshold is not a
    /// positive finite number or the capacity is 0.
    pub fn validate(&self) -> ClusterResult<()> {
        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return Err(ClusterError::invalid_parameter(format!(
                "micro_cluster_window.threshold must be > 0.0 and finite, got {}",
                self.threshold
            )));
        }
        if self.max_micro_clusters == 0 {
            return Err(ClusterError::invalid_parameter(
                "micro_cluster_window.max_micro_clusters must be >= 1, got 0",
            ));
        }
        Ok(())
    }
}

/// A CF stamped with the time it last absorbed a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroCluster {
    /// Sufficient statistics of absorbed points.
    pub cf: ClusteringFeature,
    /// Timestamp of the most recent absorption.
    pub last_update_time: u64,
}

impl MicroCluster {
    fn from_point(point: &Point) -> Self {
        Self {
            cf: ClusteringFeature::from_point(&point.features),
            last_update_time: point.timestamp,
        }
    }

    fn absorb(&mut self, point: &Point) {
        self.cf.add_point(&point.features);
        self.last_update_time = point.timestamp;
    }

    /// Whether this cluster may accept a point arriving at `now`.
    #[inline]
    pub fn is_within_window(&self, now: u64, time_window: u64) -> bool {
        now.saturating_sub(self.last_update_time) <= time_window
    }

    /// RMS deviation of absorbed points around the mean.
    pub fn radius(&self) -> f64 {
        self.cf.radius()
    }
}

/// Flat, capacity-bounded pool of recency-windowed micro-clusters.
#[derive(Debug, Clone)]
pub struct MicroClusterWindow {
    params: MicroClusterWindowParams,
    dimension: usize,
    micro_clusters: Vec<MicroCluster>,
    eviction_count: u64,
}

impl MicroClusterWindow {
    /// Create an empty pool.
    ///
    /// # Errors
    ///
    /// Returns `ClusterError::InvalidParameter` if dimension is 0 or the
    /// params are invalid.
    pub fn new(params: MicroClusterWindowParams, dimension: usize) -> ClusterResult<Self> {
        if dimension == 0 {
            return Err(ClusterError::invalid_parameter("dimension must be > 0"));
        }
        params.validate()?;
        Ok(Self {
            params,
            dimension,
            micro_clusters: Vec::new(),
            eviction_count: 0,
        })
    }

    /// Retained micro-clusters in creation order.
    pub fn micro_clusters(&self) -> &[MicroCluster] {
        &self.micro_clusters
    }

    /// Number of capacity evictions so far.
    pub fn eviction_count(&self) -> u64 {
        self.eviction_count
    }

    /// Insert a point; returns the evicted micro-cluster, if any.
    pub fn insert(&mut self, point: &Point) -> Option<MicroCluster> {
        debug_assert_eq!(point.dimension(), self.dimension, "point dimension mismatch");

        if self.micro_clusters.is_empty() {
            self.micro_clusters.push(MicroCluster::from_point(point));
            return None;
        }

        let now = point.timestamp;
        let window = self.params.time_window;
        let mut closest: Option<(usize, f64)> = None;
        for (i, mc) in self.micro_clusters.iter().enumerate() {
            if !mc.is_within_window(now, window) {
                continue;
            }
            let dist = mc.cf.distance_to(&point.features);
            if closest.map_or(true, |(_, best)| dist < best) {
                closest = Some((i, dist));
            }
        }

        match closest {
            Some((idx, dist)) if dist < self.params.threshold => {
                self.micro_clusters[idx].absorb(point);
                None
            }
            _ => {
                self.micro_clusters.push(MicroCluster::from_point(point));
                if self.micro_clusters.len() > self.params.max_micro_clusters {
                    self.evict_oldest()
                } else {
                    None
                }
            }
        }
    }

    /// Remove the cluster with the smallest last_update_time (first on ties).
    fn evict_oldest(&mut self) -> Option<MicroCluster> {
        let oldest = self
            .micro_clusters
            .iter()
            .enumerate()
            .min_by_key(|(_, mc)| mc.last_update_time)
            .map(|(i, _)| i)?;

        let evicted = self.micro_clusters.remove(oldest);
        self.eviction_count += 1;
        debug!(
            last_update_time = evicted.last_update_time,
            points = evicted.cf.n,
            retained = self.micro_clusters.len(),
            "Evicted oldest micro-cluster"
        );
        Some(evicted)
    }
}

impl StreamClusterer for MicroClusterWindow {
    fn name(&self) -> &'static str {
        "micro-cluster-window"
    }

    fn insert(&mut self, point: &Point) {
        MicroClusterWindow::insert(self, point);
    }

    /// Mean of every retained micro-cluster.
    fn output_centers(&self) -> Vec<Point> {
        self.micro_clusters.iter().map(|mc| mc.cf.center()).collect()
    }

    fn summary_len(&self) -> usize {
        self.micro_clusters.len()
    }
}
