//! Summary-structure maintainers for streaming clustering.
//!
//! Six interchangeable structures, each consuming points one at a time and
//! keeping a bounded summary queryable as a set of centers:
//!
//! - [`CfTree`]: height-balanced tree of clustering features with splitting
//! - [`MicroClusterWindow`]: recency-windowed micro-clusters, capacity eviction
//! - [`TemporalMicroClusterSet`]: micro-clusters pruned by creation age
//! - [`DensityGrid`]: hashed grid of density cells with expiry
//! - [`DecayTree`]: attachment tree of exponentially decaying cells
//! - [`SlidingWindow`]: FIFO of raw points re-clustered with Lloyd's algorithm
//!
//! All of them implement [`crate::StreamClusterer`].

pub mod cf_tree;
pub mod decay_tree;
pub mod density_grid;
pub mod feature;
pub mod micro_cluster_window;
pub mod sliding_window;
pub mod temporal_micro_cluster;

pub use cf_tree::{CfNode, CfTree, CfTreeParams, NodeId};
pub use decay_tree::{DecayNode, DecayTree, DecayTreeParams};
pub use density_grid::{Cell, CellKey, DensityGrid, DensityGridParams};
pub use feature::{closest_feature, ClusteringFeature};
pub use micro_cluster_window::{MicroCluster, MicroClusterWindow, MicroClusterWindowParams};
pub use sliding_window::{lloyd, LloydOutcome, SlidingWindow, SlidingWindowParams};
pub use temporal_micro_cluster::{
    TemporalMicroClusterParams, TemporalMicroClusterSet, WeightedMicroCluster,
};
