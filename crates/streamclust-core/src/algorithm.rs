//! Common contract of the summary-structure maintainers and the closed set
//! of algorithms a run can choose from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::clustering::{
    CfTree, DecayTree, DensityGrid, MicroClusterWindow, SlidingWindow, TemporalMicroClusterSet,
};
use crate::config::StreamClusterConfig;
use crate::error::{ClusterError, ClusterResult};
use crate::point::Point;

/// Incremental clusterer over a totally ordered point stream.
///
/// Insertion never fails: overflow, expiry and eviction are handled by each
/// structure's own policy. Callers must feed points in timestamp order and
/// with the dimension the structure was built for.
pub trait StreamClusterer {
    /// Short kebab-case identifier.
    fn name(&self) -> &'static str;

    /// Consume one point.
    fn insert(&mut self, point: &Point);

    /// Consume a batch in order.
    fn cluster(&mut self, points: &[Point]) {
        for point in points {
            self.insert(point);
        }
    }

    /// Current representative centers. Empty before any insertion.
    fn output_centers(&self) -> Vec<Point>;

    /// Number of retained summary units (entries, clusters, cells, nodes or
    /// window points).
    fn summary_len(&self) -> usize;
}

// =============================================================================
// AlgorithmKind
// =============================================================================

/// Selector for one of the six maintainers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmKind {
    /// [`CfTree`]
    CfTree,
    /// [`MicroClusterWindow`]
    MicroClusterWindow,
    /// [`TemporalMicroClusterSet`]
    TemporalMicroCluster,
    /// [`DensityGrid`]
    DensityGrid,
    /// [`DecayTree`]
    DecayTree,
    /// [`SlidingWindow`]
    SlidingWindow,
}

impl AlgorithmKind {
    /// All kinds in canonical run order.
    ///
    /// ```
    /// use streamclust_core::AlgorithmKind;
    ///
    /// let all = AlgorithmKind::all();
    /// assert_eq!(all.len(), 6);
    /// assert_eq!(all[0], AlgorithmKind::CfTree);
    /// ```
    #[inline]
    pub fn all() -> [AlgorithmKind; 6] {
        [
            Self::CfTree,
            Self::MicroClusterWindow,
            Self::TemporalMicroCluster,
            Self::DensityGrid,
            Self::DecayTree,
            Self::SlidingWindow,
        ]
    }

    /// Kebab-case name, also used for output file names.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::CfTree => "cf-tree",
            Self::MicroClusterWindow => "micro-cluster-window",
            Self::TemporalMicroCluster => "temporal-micro-cluster",
            Self::DensityGrid => "density-grid",
            Self::DecayTree => "decay-tree",
            Self::SlidingWindow => "sliding-window",
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for AlgorithmKind {
    type Err = ClusterError;

    /// Accepts the kebab-case slug (underscores allowed) or the classic
    /// algorithm name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "cf-tree" | "birch" => Ok(Self::CfTree),
            "micro-cluster-window" | "clustream" => Ok(Self::MicroClusterWindow),
            "temporal-micro-cluster" | "denstream" => Ok(Self::TemporalMicroCluster),
            "density-grid" | "dstream" => Ok(Self::DensityGrid),
            "decay-tree" | "edmstream" => Ok(Self::DecayTree),
            "sliding-window" | "slkmeans" => Ok(Self::SlidingWindow),
            _ => Err(ClusterError::invalid_parameter(format!(
                "unknown algorithm '{}'",
                s
            ))),
        }
    }
}

// =============================================================================
// Algorithm
// =============================================================================

/// Closed variant over the six maintainers, dispatched statically.
#[derive(Debug, Clone)]
pub enum Algorithm {
    CfTree(CfTree),
    MicroClusterWindow(MicroClusterWindow),
    TemporalMicroCluster(TemporalMicroClusterSet),
    DensityGrid(DensityGrid),
    DecayTree(DecayTree),
    SlidingWindow(SlidingWindow),
}

impl Algorithm {
    /// Build the chosen maintainer from its section of `config`.
    ///
    /// # Errors
    ///
    /// Returns `ClusterError::InvalidParameter` if dimension is 0 or the
    /// selected params fail validation.
    ///
    /// # Example
    ///
    /// ```
    /// use streamclust_core::{Algorithm, AlgorithmKind, Point, StreamClusterConfig, StreamClusterer};
    ///
    /// let config = StreamClusterConfig::default();
    /// let mut algo = Algorithm::build(AlgorithmKind::CfTree, 2, &config).unwrap();
    /// assert!(algo.output_centers().is_empty());
    ///
    /// algo.cluster(&[Point::new(vec![1.0, 2.0], 1)]);
    /// assert_eq!(algo.output_centers().len(), 1);
    /// ```
    pub fn build(
        kind: AlgorithmKind,
        dimension: usize,
        config: &StreamClusterConfig,
    ) -> ClusterResult<Self> {
        let algo = match kind {
            AlgorithmKind::CfTree => Self::CfTree(CfTree::new(config.cf_tree.clone(), dimension)?),
            AlgorithmKind::MicroClusterWindow => Self::MicroClusterWindow(MicroClusterWindow::new(
                config.micro_cluster_window.clone(),
                dimension,
            )?),
            AlgorithmKind::TemporalMicroCluster => {
                Self::TemporalMicroCluster(TemporalMicroClusterSet::new(
                    config.temporal_micro_cluster.clone(),
                    dimension,
                )?)
            }
            AlgorithmKind::DensityGrid => {
                Self::DensityGrid(DensityGrid::new(config.density_grid.clone(), dimension)?)
            }
            AlgorithmKind::DecayTree => {
                Self::DecayTree(DecayTree::new(config.decay_tree.clone(), dimension)?)
            }
            AlgorithmKind::SlidingWindow => {
                Self::SlidingWindow(SlidingWindow::new(config.sliding_window.clone(), dimension)?)
            }
        };
        Ok(algo)
    }

    /// Which maintainer this is.
    pub fn kind(&self) -> AlgorithmKind {
        match self {
            Self::CfTree(_) => AlgorithmKind::CfTree,
            Self::MicroClusterWindow(_) => AlgorithmKind::MicroClusterWindow,
            Self::TemporalMicroCluster(_) => AlgorithmKind::TemporalMicroCluster,
            Self::DensityGrid(_) => AlgorithmKind::DensityGrid,
            Self::DecayTree(_) => AlgorithmKind::DecayTree,
            Self::SlidingWindow(_) => AlgorithmKind::SlidingWindow,
        }
    }

    fn inner(&self) -> &dyn StreamClusterer {
        match self {
            Self::CfTree(a) => a,
            Self::MicroClusterWindow(a) => a,
            Self::TemporalMicroCluster(a) => a,
            Self::DensityGrid(a) => a,
            Self::DecayTree(a) => a,
            Self::SlidingWindow(a) => a,
        }
    }
}

impl StreamClusterer for Algorithm {
    fn name(&self) -> &'static str {
        self.kind().slug()
    }

    fn insert(&mut self, point: &Point) {
        match self {
            Self::CfTree(a) => a.insert(point),
            Self::MicroClusterWindow(a) => {
                a.insert(point);
            }
            Self::TemporalMicroCluster(a) => a.insert(point),
            Self::DensityGrid(a) => a.insert(point),
            Self::DecayTree(a) => {
                a.insert(point);
            }
            Self::SlidingWindow(a) => a.insert(point),
        }
    }

    fn output_centers(&self) -> Vec<Point> {
        self.inner().output_centers()
    }

    fn summary_len(&self) -> usize {
        self.inner().summary_len()
    }
}
