//! Purity of a nearest-center partition against ground-truth labels.
//!
//! Each point is assigned to its nearest reported center. For every true
//! cluster 1..=num_true_clusters the largest overlap with a single predicted
//! cluster is counted; purity is the sum of those overlaps over the total
//! number of points. Points labeled 0, unlabeled points and labels above
//! `num_true_clusters` count in the denominator only.

use serde::{Deserialize, Serialize};
use streamclust_core::Point;

use crate::util::nearest_center;

/// Purity evaluation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurityReport {
    /// Purity in [0, 1].
    pub purity: f64,
    pub num_points: usize,
    pub num_predicted_clusters: usize,
    pub num_true_clusters: usize,
}

/// Nearest-center index for every point.
///
/// With no centers every point maps to 0.
pub fn group_by_centers(points: &[Point], centers: &[Point]) -> Vec<usize> {
    points
        .iter()
        .map(|p| nearest_center(&p.features, centers).unwrap_or(0))
        .collect()
}

/// Purity of `predicts` (one predicted cluster index per point).
pub fn evaluate_purity(
    points: &[Point],
    predicts: &[usize],
    num_true_clusters: usize,
    num_predicted_clusters: usize,
) -> PurityReport {
    debug_assert_eq!(points.len(), predicts.len(), "one prediction per point");

    let mut confusion = vec![vec![0usize; num_predicted_clusters]; num_true_clusters + 1];
    for (point, &predicted) in points.iter().zip(predicts) {
        let Some(label) = point.label.map(|l| l as usize) else {
            continue;
        };
        if label <= num_true_clusters && predicted < num_predicted_clusters {
            confusion[label][predicted] += 1;
        }
    }

    let matched: usize = confusion
        .iter()
        .skip(1)
        .map(|row| row.iter().copied().max().unwrap_or(0))
        .sum();

    let purity = if points.is_empty() {
        0.0
    } else {
        matched as f64 / points.len() as f64
    };

    PurityReport {
        purity,
        num_points: points.len(),
        num_predicted_clusters,
        num_true_clusters,
    }
}
