//! Point streams with known structure.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use streamclust_core::Point;

/// A single point.
pub fn point_at(coords: &[f64], timestamp: u64) -> Point {
    Point::new(coords.to_vec(), timestamp)
}

/// Points with consecutive timestamps starting at `start`.
pub fn stream_from_coords(coords: &[&[f64]], start: u64) -> Vec<Point> {
    coords
        .iter()
        .enumerate()
        .map(|(i, c)| point_at(c, start + i as u64))
        .collect()
}

/// The two-group 2-D stream: four corners of the unit square, then two
/// points near (100, 100.5).
pub fn scenario_a_points() -> Vec<Point> {
    stream_from_coords(
        &[
            &[0.0, 0.0],
            &[0.0, 1.0],
            &[1.0, 0.0],
            &[1.0, 1.0],
            &[100.0, 100.0],
            &[100.0, 101.0],
        ],
        1,
    )
}

/// Round-robin stream of `per_cluster` points around each center.
///
/// Each coordinate is jittered uniformly in `[-spread, spread)`. Points are
/// labeled 1..=centers.len() by center and timestamped from 1.
pub fn generate_blob_stream(
    centers: &[Vec<f64>],
    per_cluster: usize,
    spread: f64,
    seed: u64,
) -> Vec<Point> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut points = Vec::with_capacity(centers.len() * per_cluster);
    for _ in 0..per_cluster {
        for (label, center) in centers.iter().enumerate() {
            let features = center
                .iter()
                .map(|c| c + rng.gen_range(-spread..spread))
                .collect();
            let timestamp = points.len() as u64 + 1;
            points.push(Point::new(features, timestamp).with_label(label as u64 + 1));
        }
    }
    points
}

/// `n` unlabeled points uniform in `[0, 100)^dim`, timestamped from 1.
pub fn generate_uniform_stream(n: usize, dim: usize, seed: u64) -> Vec<Point> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let features = (0..dim).map(|_| rng.gen_range(0.0..100.0)).collect();
            Point::new(features, i as u64 + 1)
        })
        .collect()
}
