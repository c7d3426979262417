//! Hashed grid of quantized density cells with time-based expiry.
//!
//! Each coordinate is quantized by floor division with `cell_size`. The
//! resulting integer vector is the cell's key; the cell counts the points
//! that fell into it and remembers when it was last touched. After every
//! insertion, cells untouched for more than `time_window` ticks are
//! removed. The grid derives no centers: its cell/density map is the
//! observable state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::algorithm::StreamClusterer;
use crate::error::{ClusterError, ClusterResult};
use crate::point::Point;

/// Parameters for [`DensityGrid`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityGridParams {
    /// Width of a cell along every dimension.
    pub cell_size: f64,
    /// Maximum age (now - last_touched) before a cell expires.
    pub time_window: u64,
}

impl Default for DensityGridParams {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            time_window: 1000,
        }
    }
}

impl DensityGridParams {
    /// Set cell width.
    #[must_use]
    pub fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Set expiry window.
    #[must_use]
    pub fn with_time_window(mut self, time_window: u64) -> Self {
        self.time_window = time_window;
        self
    }

    /// Validate parameters.
    ///
    /// # Errors
    ///
    /// Returns `ClusterError::InvalidParameter` if cell_size is not a
    /// positive finite number.
    pub fn validate(&self) -> ClusterResult<()> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(ClusterError::invalid_parameter(format!(
                "density_grid.cell_size must be > 0.0 and finite, got {}",
                self.cell_size
            )));
        }
        Ok(())
    }
}

/// Canonical quantized coordinates of a cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellKey(pub Vec<i64>);

impl CellKey {
    /// Quantize coordinates by floor division.
    pub fn quantize(features: &[f64], cell_size: f64) -> Self {
        Self(
            features
                .iter()
                .map(|x| (x / cell_size).floor() as i64)
                .collect(),
        )
    }
}

/// Density counter for one grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Number of points that fell into this cell.
    pub density: f64,
    /// Timestamp of the most recent point.
    pub last_touched: u64,
}

/// Dynamically grown hashed grid.
#[derive(Debug, Clone)]
pub struct DensityGrid {
    params: DensityGridParams,
    dimension: usize,
    grid: HashMap<CellKey, Cell>,
    expired_count: u64,
}

impl DensityGrid {
    /// Create an empty grid.
    ///
    /// # Errors
    ///
    /// Returns `ClusterError::InvalidParameter` if dimension is 0 or the
    /// params are invalid.
    pub fn new(params: DensityGridParams, dimension: usize) -> ClusterResult<Self> {
        if dimension == 0 {
            return Err(ClusterError::invalid_parameter("dimension must be > 0"));
        }
        params.validate()?;
        Ok(Self {
            params,
            dimension,
            grid: HashMap::new(),
            expired_count: 0,
        })
    }

    /// Key of the cell a point falls into.
    pub fn cell_key(&self, point: &Point) -> CellKey {
        CellKey::quantize(&point.features, self.params.cell_size)
    }

    /// Current cell/density map.
    pub fn cells(&self) -> &HashMap<CellKey, Cell> {
        &self.grid
    }

    /// Look up one cell.
    pub fn cell(&self, key: &CellKey) -> Option<&Cell> {
        self.grid.get(key)
    }

    /// Number of cells removed by expiry so far.
    pub fn expired_count(&self) -> u64 {
        self.expired_count
    }

    /// Count the point into its cell, then expire stale cells.
    pub fn insert(&mut self, point: &Point) {
        debug_assert_eq!(point.dimension(), self.dimension, "point dimension mismatch");

        let now = point.timestamp;
        let key = self.cell_key(point);
        let cell = self.grid.entry(key).or_insert(Cell {
            density: 0.0,
            last_touched: now,
        });
        cell.density += 1.0;
        cell.last_touched = now;

        let window = self.params.time_window;
        let before = self.grid.len();
        self.grid
            .retain(|_, cell| now.saturating_sub(cell.last_touched) <= window);
        let expired = before - self.grid.len();
        if expired > 0 {
            self.expired_count += expired as u64;
            debug!(now, expired, live = self.grid.len(), "Expired stale grid cells");
        }
    }
}

impl StreamClusterer for DensityGrid {
    fn name(&self) -> &'static str {
        "density-grid"
    }

    fn insert(&mut self, point: &Point) {
        DensityGrid::insert(self, point);
    }

    /// The grid derives no centers.
    fn output_centers(&self) -> Vec<Point> {
        Vec::new()
    }

    fn summary_len(&self) -> usize {
        self.grid.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(features: &[f64], ts: u64) -> Point {
        Point::new(features.to_vec(), ts)
    }

    fn grid(cell_size: f64, time_window: u64) -> DensityGrid {
        let params = DensityGridParams::default()
            .with_cell_size(cell_size)
            .with_time_window(time_window);
        DensityGrid::new(params, 2).unwrap()
    }

    #[test]
    fn test_params_validation() {
        assert!(DensityGridParams::default().validate().is_ok());
        assert!(DensityGridParams::default().with_cell_size(0.0).validate().is_err());
        assert!(DensityGridParams::default().with_cell_size(-2.0).validate().is_err());
        println!("[PASS] test_params_validation");
    }

    #[test]
    fn test_quantize_floors_negative_coordinates() {
        let key = CellKey::quantize(&[-0.5, 2.5, -3.0], 1.0);
        assert_eq!(key, CellKey(vec![-1, 2, -3]));
        let key = CellKey::quantize(&[4.9, 5.0], 2.5);
        assert_eq!(key, CellKey(vec![1, 2]));
        println!("[PASS] test_quantize_floors_negative_coordinates");
    }

    #[test]
    fn test_same_cell_regardless_of_order() {
        let mut a = grid(1.0, 100);
        let mut b = grid(1.0, 100);
        let p = pt(&[3.2, 7.9], 1);
        let q = pt(&[3.7, 7.1], 2);

        a.insert(&p);
        a.insert(&q);
        b.insert(&pt(&q.features, 1));
        b.insert(&pt(&p.features, 2));

        assert_eq!(a.cell_key(&p), a.cell_key(&q));
        assert_eq!(a.cells().len(), 1);
        assert_eq!(b.cells().len(), 1);
        assert_eq!(a.cell(&a.cell_key(&p)).unwrap().density, 2.0);
        assert_eq!(b.cell(&b.cell_key(&p)).unwrap().density, 2.0);
        println!("[PASS] test_same_cell_regardless_of_order");
    }

    #[test]
    fn test_touch_refreshes_timestamp() {
        let mut g = grid(1.0, 100);
        g.insert(&pt(&[0.5, 0.5], 3));
        g.insert(&pt(&[0.1, 0.9], 8));
        let cell = g.cell(&CellKey(vec![0, 0])).unwrap();
        assert_eq!(cell.density, 2.0);
        assert_eq!(cell.last_touched, 8);
        println!("[PASS] test_touch_refreshes_timestamp");
    }

    #[test]
    fn test_stale_cells_expire() {
        let mut g = grid(1.0, 10);
        g.insert(&pt(&[0.0, 0.0], 0));
        g.insert(&pt(&[5.0, 5.0], 10));
        assert_eq!(g.cells().len(), 2, "age 10 is still inside the window");

        g.insert(&pt(&[9.0, 9.0], 11));
        assert_eq!(g.cells().len(), 2);
        assert!(g.cell(&CellKey(vec![0, 0])).is_none());
        assert_eq!(g.expired_count(), 1);
        println!("[PASS] test_stale_cells_expire");
    }

    #[test]
    fn test_stale_cell_touched_again_keeps_density() {
        let mut g = grid(1.0, 10);
        g.insert(&pt(&[0.5, 0.5], 0));
        // 50 ticks later the cell is long stale, but the increment refreshes
        // it before the sweep runs
        g.insert(&pt(&[0.2, 0.8], 50));

        let cell = g.cell(&CellKey(vec![0, 0])).unwrap();
        assert_eq!(cell.density, 2.0);
        assert_eq!(cell.last_touched, 50);
        assert_eq!(g.expired_count(), 0);
        println!("[PASS] test_stale_cell_touched_again_keeps_density");
    }

    #[test]
    fn test_no_centers_derived() {
        let mut g = grid(1.0, 10);
        assert!(g.output_centers().is_empty());
        g.insert(&pt(&[0.0, 0.0], 0));
        assert!(g.output_centers().is_empty());
        assert_eq!(g.summary_len(), 1);
        println!("[PASS] test_no_centers_derived");
    }
}
