//! Clustering Feature (CF) sufficient statistic.
//!
//! A CF summarizes a set of d-dimensional points without retaining them:
//! - n: number of data points
//! - LS: per-dimension linear sum, Σ Xi
//! - SS: per-dimension squared sum, Σ Xi²
//!
//! CFs are additive: CF(A ∪ B) = CF(A) + CF(B). Incorporating one point or
//! merging another CF costs O(d).

use serde::{Deserialize, Serialize};

use crate::point::{euclidean_distance, Point};

/// Clustering Feature - statistical summary of a point set.
///
/// # Example
///
/// ```
/// use streamclust_core::clustering::ClusteringFeature;
///
/// let mut cf = ClusteringFeature::from_point(&[1.0, 2.0, 3.0]);
/// cf.add_point(&[2.0, 3.0, 4.0]);
///
/// assert_eq!(cf.n, 2);
/// assert_eq!(cf.centroid(), vec![1.5, 2.5, 3.5]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringFeature {
    /// Number of data points summarized.
    pub n: u64,
    /// Linear sum, per dimension.
    pub linear_sum: Vec<f64>,
    /// Squared sum, per dimension.
    pub squared_sum: Vec<f64>,
}

impl ClusteringFeature {
    /// Create empty CF with given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            n: 0,
            linear_sum: vec![0.0; dimension],
            squared_sum: vec![0.0; dimension],
        }
    }

    /// Create CF from a single point.
    pub fn from_point(point: &[f64]) -> Self {
        Self {
            n: 1,
            linear_sum: point.to_vec(),
            squared_sum: point.iter().map(|x| x * x).collect(),
        }
    }

    /// Get dimension of this CF.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.linear_sum.len()
    }

    /// Check if CF is empty (no points).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Incorporate one point.
    pub fn add_point(&mut self, point: &[f64]) {
        debug_assert_eq!(self.linear_sum.len(), point.len(), "point dimension mismatch");
        self.n += 1;
        for ((ls, ss), x) in self
            .linear_sum
            .iter_mut()
            .zip(self.squared_sum.iter_mut())
            .zip(point.iter())
        {
            *ls += x;
            *ss += x * x;
        }
    }

    /// Merge another CF into this one.
    ///
    /// CF(A ∪ B) = (n_A + n_B, LS_A + LS_B, SS_A + SS_B)
    pub fn merge(&mut self, other: &ClusteringFeature) {
        if other.n == 0 {
            return;
        }
        debug_assert_eq!(self.dimension(), other.dimension(), "CF dimension mismatch");

        self.n += other.n;
        for (a, b) in self.linear_sum.iter_mut().zip(other.linear_sum.iter()) {
            *a += b;
        }
        for (a, b) in self.squared_sum.iter_mut().zip(other.squared_sum.iter()) {
            *a += b;
        }
    }

    /// Compute centroid (mean point).
    ///
    /// centroid = LS / n
    ///
    /// Returns zero vector if n=0.
    pub fn centroid(&self) -> Vec<f64> {
        if self.n == 0 {
            return vec![0.0; self.dimension()];
        }
        let n = self.n as f64;
        self.linear_sum.iter().map(|x| x / n).collect()
    }

    /// Centroid wrapped as an unlabeled point.
    pub fn center(&self) -> Point {
        Point::new(self.centroid(), 0)
    }

    /// Compute radius: sqrt(Σ_d (SS_d/n - mean_d²)).
    ///
    /// Negative per-dimension variance from rounding is clamped to 0.
    pub fn radius(&self) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        let n = self.n as f64;
        let variance: f64 = self
            .linear_sum
            .iter()
            .zip(self.squared_sum.iter())
            .map(|(ls, ss)| {
                let mean = ls / n;
                (ss / n - mean * mean).max(0.0)
            })
            .sum();
        variance.sqrt()
    }

    /// Euclidean distance from a point to this CF's centroid.
    ///
    /// Callers must not query an empty CF; it has no meaningful mean.
    pub fn distance_to(&self, point: &[f64]) -> f64 {
        debug_assert!(self.n > 0, "distance query against an empty CF");
        euclidean_distance(&self.centroid(), point)
    }
}

/// Index and distance of the CF whose centroid is closest to `point`.
///
/// Ties resolve to the first minimum. Returns None for an empty slice.
pub fn closest_feature<'a, I>(features: I, point: &[f64]) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = &'a ClusteringFeature>,
{
    let mut best: Option<(usize, f64)> = None;
    for (i, cf) in features.into_iter().enumerate() {
        let dist = cf.distance_to(point);
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((i, dist)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cf_new_empty() {
        let cf = ClusteringFeature::new(4);
        assert_eq!(cf.n, 0);
        assert_eq!(cf.dimension(), 4);
        assert!(cf.is_empty());
        assert!(cf.linear_sum.iter().all(|&x| x == 0.0));
        assert!(cf.squared_sum.iter().all(|&x| x == 0.0));
        println!("[PASS] test_cf_new_empty - dimension={}", cf.dimension());
    }

    #[test]
    fn test_cf_from_point() {
        let cf = ClusteringFeature::from_point(&[1.0, 2.0, 3.0]);
        assert_eq!(cf.n, 1);
        assert_eq!(cf.linear_sum, vec![1.0, 2.0, 3.0]);
        assert_eq!(cf.squared_sum, vec![1.0, 4.0, 9.0]);
        assert_eq!(cf.centroid(), vec![1.0, 2.0, 3.0]);
        println!("[PASS] test_cf_from_point");
    }

    #[test]
    fn test_cf_mean_equals_arithmetic_mean() {
        let points = [[0.0, 10.0], [2.0, 14.0], [7.0, -3.0], [3.0, 3.0]];
        let mut cf = ClusteringFeature::new(2);
        for p in &points {
            cf.add_point(p);
        }

        let expected_x = points.iter().map(|p| p[0]).sum::<f64>() / points.len() as f64;
        let expected_y = points.iter().map(|p| p[1]).sum::<f64>() / points.len() as f64;
        let centroid = cf.centroid();

        assert_eq!(cf.n, points.len() as u64);
        assert!((centroid[0] - expected_x).abs() < 1e-12);
        assert!((centroid[1] - expected_y).abs() < 1e-12);
        println!("[PASS] test_cf_mean_equals_arithmetic_mean - centroid={:?}", centroid);
    }

    #[test]
    fn test_cf_centroid_empty_is_zero() {
        let cf = ClusteringFeature::new(3);
        assert_eq!(cf.centroid(), vec![0.0, 0.0, 0.0]);
        println!("[PASS] test_cf_centroid_empty_is_zero");
    }

    #[test]
    fn test_cf_merge_two_cfs() {
        let mut cf1 = ClusteringFeature::from_point(&[1.0, 2.0]);
        let cf2 = ClusteringFeature::from_point(&[3.0, 4.0]);
        cf1.merge(&cf2);

        assert_eq!(cf1.n, 2);
        assert_eq!(cf1.linear_sum, vec![4.0, 6.0]);
        assert_eq!(cf1.squared_sum, vec![10.0, 20.0]);
        assert_eq!(cf1.centroid(), vec![2.0, 3.0]);
        println!("[PASS] test_cf_merge_two_cfs - n={}", cf1.n);
    }

    #[test]
    fn test_cf_merge_with_empty_is_noop() {
        let mut cf1 = ClusteringFeature::from_point(&[1.0, 2.0]);
        cf1.merge(&ClusteringFeature::new(2));
        assert_eq!(cf1.n, 1);
        assert_eq!(cf1.linear_sum, vec![1.0, 2.0]);
        println!("[PASS] test_cf_merge_with_empty_is_noop");
    }

    #[test]
    fn test_cf_merge_into_empty() {
        let mut cf1 = ClusteringFeature::new(2);
        cf1.merge(&ClusteringFeature::from_point(&[1.0, 2.0]));
        assert_eq!(cf1.n, 1);
        assert_eq!(cf1.centroid(), vec![1.0, 2.0]);
        println!("[PASS] test_cf_merge_into_empty");
    }

    #[test]
    fn test_cf_radius_symmetric_points() {
        let mut cf = ClusteringFeature::new(2);
        cf.add_point(&[-1.0, 0.0]);
        cf.add_point(&[1.0, 0.0]);
        assert!((cf.radius() - 1.0).abs() < 1e-12);
        println!("[PASS] test_cf_radius_symmetric_points - radius={}", cf.radius());
    }

    #[test]
    fn test_cf_radius_single_point_and_empty() {
        assert_eq!(ClusteringFeature::from_point(&[5.0, 5.0]).radius(), 0.0);
        assert_eq!(ClusteringFeature::new(2).radius(), 0.0);
        println!("[PASS] test_cf_radius_single_point_and_empty");
    }

    #[test]
    fn test_cf_radius_never_nan_under_rounding() {
        let mut cf = ClusteringFeature::new(2);
        for _ in 0..1000 {
            cf.add_point(&[1e-10, 1e8]);
        }
        let radius = cf.radius();
        assert!(!radius.is_nan());
        assert!(radius >= 0.0);
        println!("[PASS] test_cf_radius_never_nan_under_rounding - radius={}", radius);
    }

    #[test]
    fn test_cf_distance_to_point() {
        let cf = ClusteringFeature::from_point(&[0.0, 0.0]);
        assert!((cf.distance_to(&[3.0, 4.0]) - 5.0).abs() < 1e-12);
        println!("[PASS] test_cf_distance_to_point");
    }

    #[test]
    fn test_closest_feature_first_minimum() {
        let cfs = vec![
            ClusteringFeature::from_point(&[10.0]),
            ClusteringFeature::from_point(&[-1.0]),
            ClusteringFeature::from_point(&[1.0]),
        ];
        // -1 and 1 are equidistant from 0: the first one wins
        let (idx, dist) = closest_feature(&cfs, &[0.0]).expect("non-empty");
        assert_eq!(idx, 1);
        assert!((dist - 1.0).abs() < 1e-12);

        assert!(closest_feature(&Vec::<ClusteringFeature>::new(), &[0.0]).is_none());
        println!("[PASS] test_closest_feature_first_minimum");
    }

    #[test]
    fn test_cf_serialization_roundtrip() {
        let mut cf = ClusteringFeature::from_point(&[1.0, 2.0, 3.0]);
        cf.add_point(&[4.0, 5.0, 6.0]);

        let json = serde_json::to_string(&cf).expect("serialize must succeed");
        let restored: ClusteringFeature =
            serde_json::from_str(&json).expect("deserialize must succeed");

        assert_eq!(cf, restored);
        println!("[PASS] test_cf_serialization_roundtrip - JSON: {}", json);
    }
}
