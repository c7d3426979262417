//! Shared utility functions for benchmarking.

use std::time::Duration;

use streamclust_core::{euclidean_distance, Point};

/// Index of the center nearest to `features`, first minimum on ties.
///
/// Returns None if there are no centers.
pub fn nearest_center(features: &[f64], centers: &[Point]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (j, center) in centers.iter().enumerate() {
        let dist = euclidean_distance(features, &center.features);
        if best.map_or(true, |(_, d)| dist < d) {
            best = Some((j, dist));
        }
    }
    best.map(|(j, _)| j)
}

/// Points per second, 0.0 for a zero-length run.
pub fn throughput(points: usize, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        points as f64 / secs
    } else {
        0.0
    }
}

/// Format one center as whitespace-separated coordinates.
pub fn format_center(center: &Point) -> String {
    center
        .features
        .iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
