//! Sliding window of raw points, fully re-clustered with Lloyd's algorithm
//! on every admission.
//!
//! The window is a FIFO bounded by `window_size`. Once it holds at least `k`
//! points, each insertion draws `k` initial centroids uniformly (with
//! replacement) from the window and iterates assignment and mean update
//! until no assignment changes. Centroids that attract no point keep their
//! previous position. Initialization uses a seeded `ChaCha8Rng`, so a run is
//! reproducible for a fixed seed and stream.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::algorithm::StreamClusterer;
use crate::error::{ClusterError, ClusterResult};
use crate::point::{euclidean_distance, Point};

// =============================================================================
// SlidingWindowParams
// =============================================================================

/// Parameters for [`SlidingWindow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlidingWindowParams {
    /// Number of centroids.
    pub k: usize,
    /// FIFO capacity.
    pub window_size: usize,
    /// Seed for centroid initialization.
    pub seed: u64,
    /// Upper bound on Lloyd iterations per reclustering.
    pub max_iterations: usize,
}

impl Default for SlidingWindowParams {
    fn default() -> Self {
        Self {
            k: 5,
            window_size: 1000,
            seed: 42,
            max_iterations: 300,
        }
    }
}

impl SlidingWindowParams {
    /// Set number of centroids.
    #[must_use]
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Set window capacity.
    #[must_use]
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Set initialization seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set iteration cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Validate parameters.
    ///
    /// # Errors
    ///
    /// Returns `ClusterError::InvalidParameter` if:
    /// - k == 0
    /// - window_size < k
    /// - max_iterations == 0
    pub fn validate(&self) -> ClusterResult<()> {
        if self.k == 0 {
            return Err(ClusterError::invalid_parameter(
                "sliding_window.k must be >= 1, got 0",
            ));
        }
        if self.window_size < self.k {
            return Err(ClusterError::invalid_parameter(format!(
                "sliding_window.window_size must be >= k ({}), got {}",
                self.k, self.window_size
            )));
        }
        if self.max_iterations == 0 {
            return Err(ClusterError::invalid_parameter(
                "sliding_window.max_iterations must be >= 1, got 0",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Lloyd's algorithm
// =============================================================================

/// Result of one Lloyd run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LloydOutcome {
    /// Final centroids, same count and order as the initial ones.
    pub centroids: Vec<Vec<f64>>,
    /// Index of the assigned centroid for every input point.
    pub assignments: Vec<usize>,
    /// Assignment passes performed.
    pub iterations: usize,
    /// Whether the last pass changed no assignment.
    pub converged: bool,
}

/// Index of the nearest centroid, first minimum on ties.
fn nearest_centroid(centroids: &[Vec<f64>], features: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, c) in centroids.iter().enumerate() {
        let dist = euclidean_distance(c, features);
        if best.map_or(true, |(_, d)| dist < d) {
            best = Some((i, dist));
        }
    }
    best.map(|(i, _)| i)
}

/// Run Lloyd's algorithm from the given centroids.
///
/// Alternates nearest-centroid assignment and mean update until an
/// assignment pass changes nothing or `max_iterations` passes have run.
/// The first pass always counts as a change. A centroid with no assigned
/// points is left where it was.
///
/// The result depends only on the inputs: the same points and initial
/// centroids always give the same partition.
pub fn lloyd(
    points: &[Point],
    initial_centroids: Vec<Vec<f64>>,
    max_iterations: usize,
) -> LloydOutcome {
    let mut centroids = initial_centroids;
    if centroids.is_empty() || points.is_empty() {
        return LloydOutcome {
            centroids,
            assignments: Vec::new(),
            iterations: 0,
            converged: true,
        };
    }

    let dimension = centroids[0].len();
    let mut assignments: Vec<Option<usize>> = vec![None; points.len()];
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        iterations += 1;

        let mut changed = false;
        for (point, slot) in points.iter().zip(assignments.iter_mut()) {
            let nearest = nearest_centroid(&centroids, &point.features);
            if *slot != nearest {
                *slot = nearest;
                changed = true;
            }
        }
        if !changed {
            converged = true;
            break;
        }

        let mut sums = vec![vec![0.0; dimension]; centroids.len()];
        let mut counts = vec![0usize; centroids.len()];
        for (point, slot) in points.iter().zip(&assignments) {
            if let Some(c) = *slot {
                counts[c] += 1;
                for (s, x) in sums[c].iter_mut().zip(&point.features) {
                    *s += x;
                }
            }
        }
        for ((centroid, sum), &count) in centroids.iter_mut().zip(sums).zip(&counts) {
            if count > 0 {
                *centroid = sum.into_iter().map(|s| s / count as f64).collect();
            }
        }
    }

    LloydOutcome {
        centroids,
        assignments: assignments.into_iter().map(|a| a.unwrap_or(0)).collect(),
        iterations,
        converged,
    }
}

// =============================================================================
// SlidingWindow
// =============================================================================

/// Bounded FIFO re-clustered on every admission.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    params: SlidingWindowParams,
    dimension: usize,
    window: VecDeque<Point>,
    rng: ChaCha8Rng,
    centroids: Vec<Vec<f64>>,
    assignments: Vec<usize>,
    recluster_count: u64,
}

impl SlidingWindow {
    /// Create an empty window.
    ///
    /// # Errors
    ///
    /// Returns `ClusterError::InvalidParameter` if dimension is 0 or the
    /// params are invalid.
    pub fn new(params: SlidingWindowParams, dimension: usize) -> ClusterResult<Self> {
        if dimension == 0 {
            return Err(ClusterError::invalid_parameter("dimension must be > 0"));
        }
        params.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(params.seed);
        Ok(Self {
            window: VecDeque::with_capacity(params.window_size + 1),
            params,
            dimension,
            rng,
            centroids: Vec::new(),
            assignments: Vec::new(),
            recluster_count: 0,
        })
    }

    /// Points currently in the window, oldest first.
    pub fn window(&self) -> &VecDeque<Point> {
        &self.window
    }

    /// Centroid index per window point from the last reclustering.
    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    /// Number of reclusterings so far.
    pub fn recluster_count(&self) -> u64 {
        self.recluster_count
    }

    /// Admit a point, then recluster once the window holds k points.
    pub fn insert(&mut self, point: &Point) {
        debug_assert_eq!(point.dimension(), self.dimension, "point dimension mismatch");

        self.window.push_back(point.clone());
        if self.window.len() > self.params.window_size {
            self.window.pop_front();
        }
        if self.window.len() >= self.params.k {
            self.recluster();
        }
    }

    fn recluster(&mut self) {
        let len = self.window.len();
        let initial: Vec<Vec<f64>> = (0..self.params.k)
            .map(|_| self.window[self.rng.gen_range(0..len)].features.clone())
            .collect();

        let max_iterations = self.params.max_iterations;
        let outcome = lloyd(self.window.make_contiguous(), initial, max_iterations);
        self.recluster_count += 1;
        trace!(
            window = len,
            iterations = outcome.iterations,
            converged = outcome.converged,
            "Reclustered sliding window"
        );

        self.centroids = outcome.centroids;
        self.assignments = outcome.assignments;
    }
}

impl StreamClusterer for SlidingWindow {
    fn name(&self) -> &'static str {
        "sliding-window"
    }

    fn insert(&mut self, point: &Point) {
        SlidingWindow::insert(self, point);
    }

    /// Centroids of the last reclustering; empty until the window holds k
    /// points.
    fn output_centers(&self) -> Vec<Point> {
        self.centroids
            .iter()
            .map(|c| Point::new(c.clone(), 0))
            .collect()
    }

    fn summary_len(&self) -> usize {
        self.window.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(features: &[f64], ts: u64) -> Point {
        Point::new(features.to_vec(), ts)
    }

    fn two_blobs() -> Vec<Point> {
        vec![
            pt(&[0.0, 0.0], 0),
            pt(&[0.0, 1.0], 1),
            pt(&[1.0, 0.0], 2),
            pt(&[10.0, 10.0], 3),
            pt(&[10.0, 11.0], 4),
            pt(&[11.0, 10.0], 5),
        ]
    }

    #[test]
    fn test_params_validation() {
        assert!(SlidingWindowParams::default().validate().is_ok());
        assert!(SlidingWindowParams::default().with_k(0).validate().is_err());
        let err = SlidingWindowParams::default()
            .with_k(10)
            .with_window_size(5)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("window_size"));
        println!("[PASS] test_params_validation");
    }

    #[test]
    fn test_lloyd_separates_two_blobs() {
        let points = two_blobs();
        let outcome = lloyd(&points, vec![vec![0.0, 0.0], vec![10.0, 10.0]], 100);

        assert!(outcome.converged);
        assert_eq!(outcome.assignments, vec![0, 0, 0, 1, 1, 1]);
        let c0 = &outcome.centroids[0];
        let c1 = &outcome.centroids[1];
        assert!((c0[0] - 1.0 / 3.0).abs() < 1e-12 && (c0[1] - 1.0 / 3.0).abs() < 1e-12);
        assert!((c1[0] - 31.0 / 3.0).abs() < 1e-12 && (c1[1] - 31.0 / 3.0).abs() < 1e-12);
        println!("[PASS] test_lloyd_separates_two_blobs - iterations={}", outcome.iterations);
    }

    #[test]
    fn test_lloyd_is_deterministic() {
        let points = two_blobs();
        let init = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let a = lloyd(&points, init.clone(), 100);
        let b = lloyd(&points, init, 100);
        assert_eq!(a, b);
        println!("[PASS] test_lloyd_is_deterministic");
    }

    #[test]
    fn test_lloyd_keeps_empty_centroid() {
        let points = two_blobs();
        let far = vec![1000.0, 1000.0];
        let outcome = lloyd(&points, vec![vec![0.0, 0.0], far.clone()], 100);
        assert_eq!(outcome.centroids[1], far);
        assert!(outcome.assignments.iter().all(|&a| a == 0));
        println!("[PASS] test_lloyd_keeps_empty_centroid");
    }

    #[test]
    fn test_lloyd_respects_iteration_cap() {
        let points = two_blobs();
        let outcome = lloyd(&points, vec![vec![0.0, 0.0], vec![0.0, 1.0]], 1);
        assert_eq!(outcome.iterations, 1);
        assert!(!outcome.converged);
        println!("[PASS] test_lloyd_respects_iteration_cap");
    }

    #[test]
    fn test_no_centers_below_k() {
        let params = SlidingWindowParams::default().with_k(3).with_window_size(10);
        let mut sw = SlidingWindow::new(params, 2).unwrap();
        sw.insert(&pt(&[0.0, 0.0], 0));
        sw.insert(&pt(&[1.0, 1.0], 1));
        assert!(sw.output_centers().is_empty());
        assert_eq!(sw.recluster_count(), 0);

        sw.insert(&pt(&[2.0, 2.0], 2));
        assert_eq!(sw.output_centers().len(), 3);
        assert_eq!(sw.assignments().len(), 3);
        println!("[PASS] test_no_centers_below_k");
    }

    #[test]
    fn test_window_is_fifo_bounded() {
        let params = SlidingWindowParams::default().with_k(2).with_window_size(4);
        let mut sw = SlidingWindow::new(params, 1).unwrap();
        for t in 0..10u64 {
            sw.insert(&pt(&[t as f64], t));
        }
        assert_eq!(sw.window().len(), 4);
        let stamps: Vec<u64> = sw.window().iter().map(|p| p.timestamp).collect();
        assert_eq!(stamps, vec![6, 7, 8, 9]);
        assert_eq!(sw.recluster_count(), 9, "reclusters from the second point on");
        println!("[PASS] test_window_is_fifo_bounded");
    }

    #[test]
    fn test_same_seed_same_centers() {
        let params = SlidingWindowParams::default().with_k(2).with_window_size(6).with_seed(7);
        let mut a = SlidingWindow::new(params.clone(), 2).unwrap();
        let mut b = SlidingWindow::new(params, 2).unwrap();
        for p in two_blobs() {
            a.insert(&p);
            b.insert(&p);
        }
        assert_eq!(a.output_centers(), b.output_centers());
        println!("[PASS] test_same_seed_same_centers");
    }
}
