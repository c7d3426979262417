//! Hierarchy of exponentially decaying density cells.
//!
//! Every point becomes a cell seeded at its coordinates with density 1.
//! Before the new cell is placed, all existing cells decay by
//! `exp(-decay_rate * age)`, where age is the time since that cell was
//! created. The factor is applied on every insertion, so decay compounds
//! as a cell grows older. Placement walks the tree from the root: a node whose seed lies
//! strictly closer than its `dependent_distance` adopts a copy of the cell
//! as a direct child; otherwise the walk continues into each of its
//! children. A point can therefore land under several branches at once.
//!
//! Nodes are kept in an arena and are never removed, so decaying the whole
//! tree is a pass over the arena.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::algorithm::StreamClusterer;
use crate::error::{ClusterError, ClusterResult};
use crate::point::{euclidean_distance, Point};

/// Parameters for [`DecayTree`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayTreeParams {
    /// Exponential decay rate per tick.
    pub decay_rate: f64,
    /// Minimum density (strict) for a node to be reported.
    pub density_threshold: f64,
    /// Attachment radius given to every node at creation.
    pub dependent_distance: f64,
}

impl Default for DecayTreeParams {
    fn default() -> Self {
        Self {
            decay_rate: 0.01,
            density_threshold: 0.1,
            dependent_distance: 5000.0,
        }
    }
}

impl DecayTreeParams {
    /// Set decay rate.
    #[must_use]
    pub fn with_decay_rate(mut self, rate: f64) -> Self {
        self.decay_rate = rate;
        self
    }

    /// Set reporting threshold.
    #[must_use]
    pub fn with_density_threshold(mut self, threshold: f64) -> Self {
        self.density_threshold = threshold;
        self
    }

    /// Set attachment radius.
    #[must_use]
    pub fn with_dependent_distance(mut self, distance: f64) -> Self {
        self.dependent_distance = distance;
        self
    }

    /// Validate parameters.
    ///
    /// # Errors
    ///
    /// Returns `ClusterError::InvalidParameter` if any value is negative or
    /// non-finite, or the dependent distance is 0.
    pub fn validate(&self) -> ClusterResult<()> {
        if !(self.decay_rate.is_finite() && self.decay_rate >= 0.0) {
            return Err(ClusterError::invalid_parameter(format!(
                "decay_tree.decay_rate must be >= 0.0 and finite, got {}",
                self.decay_rate
            )));
        }
        if !(self.density_threshold.is_finite() && self.density_threshold >= 0.0) {
            return Err(ClusterError::invalid_parameter(format!(
                "decay_tree.density_threshold must be >= 0.0 and finite, got {}",
                self.density_threshold
            )));
        }
        if !(self.dependent_distance.is_finite() && self.dependent_distance > 0.0) {
            return Err(ClusterError::invalid_parameter(format!(
                "decay_tree.dependent_distance must be > 0.0 and finite, got {}",
                self.dependent_distance
            )));
        }
        Ok(())
    }
}

/// One decaying density cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayNode {
    /// Seed coordinates.
    pub seed: Vec<f64>,
    /// Current decayed density.
    pub density: f64,
    /// Fixed attachment radius.
    pub dependent_distance: f64,
    /// Timestamp of the point that created this cell.
    pub created_at: u64,
    /// Arena indices of attached cells.
    pub children: Vec<usize>,
}

impl DecayNode {
    fn from_point(point: &Point, dependent_distance: f64) -> Self {
        Self {
            seed: point.features.clone(),
            density: 1.0,
            dependent_distance,
            created_at: point.timestamp,
            children: Vec::new(),
        }
    }

    /// Seed divided by density.
    pub fn normalized_seed(&self) -> Vec<f64> {
        self.seed.iter().map(|x| x / self.density).collect()
    }
}

/// Rooted attachment tree of decaying cells.
#[derive(Debug, Clone)]
pub struct DecayTree {
    params: DecayTreeParams,
    dimension: usize,
    nodes: Vec<DecayNode>,
    root: Option<usize>,
    unattached_count: u64,
}

impl DecayTree {
    /// Create an empty tree.
    ///
    /// # Errors
    ///
    /// Returns `ClusterError::InvalidParameter` if dimension is 0 or the
    /// params are invalid.
    pub fn new(params: DecayTreeParams, dimension: usize) -> ClusterResult<Self> {
        if dimension == 0 {
            return Err(ClusterError::invalid_parameter("dimension must be > 0"));
        }
        params.validate()?;
        Ok(Self {
            params,
            dimension,
            nodes: Vec::new(),
            root: None,
            unattached_count: 0,
        })
    }

    /// All cells in creation order.
    pub fn nodes(&self) -> &[DecayNode] {
        &self.nodes
    }

    /// Root cell index, None before the first insertion.
    pub fn root(&self) -> Option<usize> {
        self.root
    }

    /// Number of cells, counting every copy of a multiply attached point.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of points that matched no node and were dropped.
    pub fn unattached_count(&self) -> u64 {
        self.unattached_count
    }

    /// Decay every cell, then attach the point. Returns how many copies of
    /// the point were attached.
    pub fn insert(&mut self, point: &Point) -> usize {
        debug_assert_eq!(point.dimension(), self.dimension, "point dimension mismatch");

        self.decay_all(point.timestamp);

        let cell = DecayNode::from_point(point, self.params.dependent_distance);
        let Some(root) = self.root else {
            self.nodes.push(cell);
            self.root = Some(0);
            return 1;
        };

        let mut attached = 0;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if euclidean_distance(&cell.seed, &node.seed) < node.dependent_distance {
                let child = self.nodes.len();
                self.nodes.push(cell.clone());
                self.nodes[id].children.push(child);
                attached += 1;
            } else {
                stack.extend(node.children.iter().rev().copied());
            }
        }

        if attached == 0 {
            self.unattached_count += 1;
            trace!(timestamp = point.timestamp, "Point matched no decay node");
        }
        attached
    }

    fn decay_all(&mut self, now: u64) {
        let rate = self.params.decay_rate;
        for node in &mut self.nodes {
            let age = now.saturating_sub(node.created_at) as f64;
            node.density *= (-rate * age).exp();
        }
    }
}

impl StreamClusterer for DecayTree {
    fn name(&self) -> &'static str {
        "decay-tree"
    }

    fn insert(&mut self, point: &Point) {
        DecayTree::insert(self, point);
    }

    /// Density-normalized seed of every cell above the density threshold,
    /// in depth-first order.
    fn output_centers(&self) -> Vec<Point> {
        let mut centers = Vec::new();
        let mut stack: Vec<usize> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.density > self.params.density_threshold {
                centers.push(Point::new(node.normalized_seed(), 0));
            }
            stack.extend(node.children.iter().rev().copied());
        }
        centers
    }

    fn summary_len(&self) -> usize {
        self.nodes.len()
    }
}
