//! Stream point value type.
//!
//! A point is a fixed-dimensionality feature vector stamped with the
//! position it holds in the stream. Timestamps drive every windowing and
//! decay policy, so callers must deliver points in non-decreasing
//! timestamp order.

use serde::{Deserialize, Serialize};

use crate::error::{ClusterError, ClusterResult};

/// A single observation in the stream.
///
/// # Example
///
/// ```
/// use streamclust_core::Point;
///
/// let p = Point::new(vec![3.0, 4.0], 7).with_label(2);
/// assert_eq!(p.dimension(), 2);
/// assert_eq!(p.label, Some(2));
/// assert!((p.l2_dist(&Point::new(vec![0.0, 0.0], 0)) - 5.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Feature vector.
    pub features: Vec<f64>,
    /// Stream position. Non-decreasing across a stream.
    pub timestamp: u64,
    /// Ground-truth cluster id, used only by evaluation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<u64>,
}

impl Point {
    /// Create an unlabeled point.
    pub fn new(features: Vec<f64>, timestamp: u64) -> Self {
        Self {
            features,
            timestamp,
            label: None,
        }
    }

    /// Create a point, rejecting NaN or infinite coordinates.
    ///
    /// # Errors
    ///
    /// Returns `ClusterError::NonFiniteValue` naming the first bad coordinate.
    pub fn try_new(features: Vec<f64>, timestamp: u64) -> ClusterResult<Self> {
        if let Some((index, &value)) = features.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ClusterError::NonFiniteValue { index, value });
        }
        Ok(Self::new(features, timestamp))
    }

    /// Attach a ground-truth label.
    #[must_use]
    pub fn with_label(mut self, label: u64) -> Self {
        self.label = Some(label);
        self
    }

    /// Number of features.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.features.len()
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn l2_dist(&self, other: &Point) -> f64 {
        euclidean_distance(&self.features, &other.features)
    }
}

/// Euclidean distance between two equal-length coordinate slices.
#[inline]
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "coordinate slices must share a dimension");
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
