//! CF-tree: a height-balanced tree of clustering features with online
//! insertion and splitting.
//!
//! Leaves hold CF entries that absorb nearby points. Internal nodes hold one
//! CF digest per child, used to route each point down to the closest leaf.
//! When a node overflows, the back half of its entries (and children) move
//! into a new sibling, which is registered with the parent or, at the root,
//! under a freshly created root.
//!
//! # Storage
//!
//! Nodes live in a flat arena addressed by [`NodeId`]. Every node records its
//! parent, so a split finds its parent in O(1) instead of walking the tree.
//!
//! # Digests
//!
//! Each internal digest summarizes its child's full contents: the point is
//! added to every digest on the descent path, and a split recomputes the
//! digests of both halves from their entries. No digest is ever empty, so
//! routing never divides by zero.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::algorithm::StreamClusterer;
use crate::clustering::feature::{closest_feature, ClusteringFeature};
use crate::error::{ClusterError, ClusterResult};
use crate::point::Point;

// =============================================================================
// CfTreeParams
// =============================================================================

/// Parameters for the CF-tree.
///
/// # Example
///
/// ```
/// use streamclust_core::clustering::cf_tree::CfTreeParams;
///
/// let params = CfTreeParams::default().with_threshold(2.0).with_max_entries(8);
/// assert!(params.validate().is_ok());
/// assert_eq!(params.max_entries, 8);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CfTreeParams {
    /// Absorption threshold.
    /// A point merges into the closest leaf CF only if strictly closer than this.
    pub threshold: f64,

    /// Maximum CF entries per leaf node.
    /// When exceeded, the leaf splits.
    pub max_entries: usize,

    /// Maximum children per internal node.
    /// When exceeded, the internal node splits.
    pub branching_factor: usize,
}

impl Default for CfTreeParams {
    fn default() -> Self {
        Self {
            threshold: 1000.0,
            max_entries: 100,
            branching_factor: 50,
        }
    }
}

impl CfTreeParams {
    /// Create new params.
    ///
    /// Values are NOT automatically validated - call validate() to check.
    pub fn new(threshold: f64, max_entries: usize, branching_factor: usize) -> Self {
        Self {
            threshold,
            max_entries,
            branching_factor,
        }
    }

    /// Set threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set max leaf entries.
    #[must_use]
    pub fn with_max_entries(mut self, entries: usize) -> Self {
        self.max_entries = entries;
        self
    }

    /// Set branching factor.
    #[must_use]
    pub fn with_branching_factor(mut self, bf: usize) -> Self {
        self.branching_factor = bf;
        self
    }

    /// Validate parameters.
    ///
    /// # Errors
    ///
    /// Returns `ClusterError::InvalidParameter` if:
    /// - threshold <= 0.0 or threshold is NaN/Infinity
    /// - max_entries < 2
    /// - branching_factor < 2
    pub fn validate(&self) -> ClusterResult<()> {
        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return Err(ClusterError::invalid_parameter(format!(
                "cf_tree.threshold must be > 0.0 and finite, got {}",
                self.threshold
            )));
        }

        if self.max_entries < 2 {
            return Err(ClusterError::invalid_parameter(format!(
                "cf_tree.max_entries must be >= 2, got {}. A split needs two halves.",
                self.max_entries
            )));
        }

        if self.branching_factor < 2 {
            return Err(ClusterError::invalid_parameter(format!(
                "cf_tree.branching_factor must be >= 2, got {}. Internal nodes need at least 2 children.",
                self.branching_factor
            )));
        }

        Ok(())
    }
}

// =============================================================================
// CfNode
// =============================================================================

/// Stable index of a node in the tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Node in the CF-tree.
///
/// A leaf owns CF entries directly and has no children. An internal node
/// owns one digest per child; `entries[i]` summarizes `children[i]`.
#[derive(Debug, Clone)]
pub struct CfNode {
    /// Whether this is a leaf node.
    pub is_leaf: bool,
    /// Parent node, None for the root.
    pub parent: Option<NodeId>,
    /// Leaf CF entries, or per-child digests for internal nodes.
    pub entries: Vec<ClusteringFeature>,
    /// Children, parallel to `entries`. Empty for leaves.
    pub children: Vec<NodeId>,
}

impl CfNode {
    fn new_leaf(parent: Option<NodeId>) -> Self {
        Self {
            is_leaf: true,
            parent,
            entries: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Merge of every entry in this node.
    pub fn summary(&self, dimension: usize) -> ClusteringFeature {
        let mut total = ClusteringFeature::new(dimension);
        for entry in &self.entries {
            total.merge(entry);
        }
        total
    }

    /// Number of slots (entries for leaves, children for internal nodes).
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if node has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// CfTree
// =============================================================================

/// CF-tree for incremental clustering.
///
/// Memory is bounded by the fanout and depth of the tree, independent of
/// stream length.
///
/// # Example
///
/// ```
/// use streamclust_core::clustering::cf_tree::{CfTree, CfTreeParams};
/// use streamclust_core::{Point, StreamClusterer};
///
/// let mut tree = CfTree::new(CfTreeParams::default().with_threshold(2.0), 2).unwrap();
/// tree.cluster(&[
///     Point::new(vec![0.0, 0.0], 1),
///     Point::new(vec![0.0, 1.0], 2),
///     Point::new(vec![50.0, 50.0], 3),
/// ]);
///
/// assert_eq!(tree.total_points(), 3);
/// assert_eq!(tree.output_centers().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct CfTree {
    params: CfTreeParams,
    dimension: usize,
    nodes: Vec<CfNode>,
    root: NodeId,
    total_points: u64,
    split_count: u64,
}

impl CfTree {
    /// Create a new empty tree whose root is an empty leaf.
    ///
    /// # Errors
    ///
    /// Returns `ClusterError::InvalidParameter` if dimension is 0 or
    /// params.validate() fails.
    pub fn new(params: CfTreeParams, dimension: usize) -> ClusterResult<Self> {
        if dimension == 0 {
            return Err(ClusterError::invalid_parameter(
                "dimension must be > 0; CF-tree requires positive point dimension",
            ));
        }
        params.validate()?;

        Ok(Self {
            params,
            dimension,
            nodes: vec![CfNode::new_leaf(None)],
            root: NodeId(0),
            total_points: 0,
            split_count: 0,
        })
    }

    /// Parameters this tree was built with.
    pub fn params(&self) -> &CfTreeParams {
        &self.params
    }

    /// Root node id.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Access a node by id.
    #[inline]
    pub fn node(&self, id: NodeId) -> &CfNode {
        &self.nodes[id.0]
    }

    /// Number of nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of points inserted so far.
    pub fn total_points(&self) -> u64 {
        self.total_points
    }

    /// Number of node splits performed so far.
    pub fn split_count(&self) -> u64 {
        self.split_count
    }

    /// Height of the tree; a lone leaf root has depth 1.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut node = self.node(self.root);
        while let Some(&first) = node.children.first() {
            depth += 1;
            node = self.node(first);
        }
        depth
    }

    /// Leaf node ids in depth-first, left-to-right order.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if node.is_leaf {
                leaves.push(id);
            } else {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        leaves
    }

    /// Iterate every leaf CF entry.
    pub fn leaf_entries(&self) -> impl Iterator<Item = &ClusteringFeature> + '_ {
        self.leaves()
            .into_iter()
            .flat_map(move |id| self.node(id).entries.iter())
    }

    /// Insert one point.
    ///
    /// Descends to the leaf under the closest digest, then either absorbs the
    /// point into the closest leaf CF (distance strictly below threshold) or
    /// appends a new singleton CF, splitting the leaf on overflow.
    pub fn insert(&mut self, point: &Point) {
        let features = point.features.as_slice();
        debug_assert_eq!(features.len(), self.dimension, "point dimension mismatch");

        let mut current = self.root;
        while !self.nodes[current.0].is_leaf {
            let node = &mut self.nodes[current.0];
            let Some((idx, _)) = closest_feature(&node.entries, features) else {
                // Internal nodes always have at least one child.
                break;
            };
            node.entries[idx].add_point(features);
            current = node.children[idx];
        }

        let threshold = self.params.threshold;
        let leaf = &mut self.nodes[current.0];
        match closest_feature(&leaf.entries, features) {
            Some((idx, dist)) if dist < threshold => {
                leaf.entries[idx].add_point(features);
            }
            _ => {
                leaf.entries.push(ClusteringFeature::from_point(features));
                if leaf.entries.len() > self.params.max_entries {
                    self.split(current);
                }
            }
        }

        self.total_points += 1;
    }

    /// Split an overflowing node, cascading upward while parents overflow.
    fn split(&mut self, mut id: NodeId) {
        loop {
            let sibling = self.split_off_sibling(id);
            self.split_count += 1;

            let id_cf = self.nodes[id.0].summary(self.dimension);
            let sibling_cf = self.nodes[sibling.0].summary(self.dimension);

            match self.nodes[id.0].parent {
                None => {
                    let new_root = NodeId(self.nodes.len());
                    self.nodes.push(CfNode {
                        is_leaf: false,
                        parent: None,
                        entries: vec![id_cf, sibling_cf],
                        children: vec![id, sibling],
                    });
                    self.nodes[id.0].parent = Some(new_root);
                    self.nodes[sibling.0].parent = Some(new_root);
                    self.root = new_root;

                    debug!(
                        root = new_root.0,
                        depth = self.depth(),
                        "CF-tree root split, tree grew one level"
                    );
                    return;
                }
                Some(parent) => {
                    let parent_node = &mut self.nodes[parent.0];
                    if let Some(pos) = parent_node.children.iter().position(|&c| c == id) {
                        parent_node.entries[pos] = id_cf;
                    }
                    parent_node.children.push(sibling);
                    parent_node.entries.push(sibling_cf);

                    debug!(
                        node = id.0,
                        sibling = sibling.0,
                        parent = parent.0,
                        "CF-tree node split"
                    );

                    if parent_node.children.len() <= self.params.branching_factor {
                        return;
                    }
                    id = parent;
                }
            }
        }
    }

    /// Move the back half of a node's entries (and children) into a new
    /// sibling sharing the same parent. Returns the sibling's id.
    fn split_off_sibling(&mut self, id: NodeId) -> NodeId {
        let sibling = NodeId(self.nodes.len());
        let node = &mut self.nodes[id.0];
        let keep = node.entries.len() - node.entries.len() / 2;

        let entries = node.entries.split_off(keep);
        let children = if node.is_leaf {
            Vec::new()
        } else {
            node.children.split_off(keep)
        };
        let is_leaf = node.is_leaf;
        let parent = node.parent;

        for child in &children {
            self.nodes[child.0].parent = Some(sibling);
        }
        self.nodes.push(CfNode {
            is_leaf,
            parent,
            entries,
            children,
        });
        sibling
    }
}

impl StreamClusterer for CfTree {
    fn name(&self) -> &'static str {
        "cf-tree"
    }

    fn insert(&mut self, point: &Point) {
        CfTree::insert(self, point);
    }

    /// Mean of every leaf CF entry.
    fn output_centers(&self) -> Vec<Point> {
        self.leaf_entries().map(ClusteringFeature::center).collect()
    }

    fn summary_len(&self) -> usize {
        self.leaf_entries().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(features: &[f64], ts: u64) -> Point {
        Point::new(features.to_vec(), ts)
    }

    // =========================================================================
    // CfTreeParams TESTS
    // =========================================================================

    #[test]
    fn test_params_defaults() {
        let params = CfTreeParams::default();
        assert_eq!(params.threshold, 1000.0);
        assert_eq!(params.max_entries, 100);
        assert_eq!(params.branching_factor, 50);
        assert!(params.validate().is_ok());
        println!("[PASS] test_params_defaults");
    }

    #[test]
    fn test_params_reject_bad_threshold() {
        for threshold in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = CfTreeParams::default()
                .with_threshold(threshold)
                .validate()
                .unwrap_err();
            assert!(err.to_string().contains("threshold"));
        }
        println!("[PASS] test_params_reject_bad_threshold");
    }

    #[test]
    fn test_params_reject_small_fanout() {
        assert!(CfTreeParams::new(1.0, 1, 50).validate().is_err());
        let err = CfTreeParams::new(1.0, 10, 1).validate().unwrap_err();
        assert!(err.to_string().contains("branching_factor"));
        assert!(CfTreeParams::new(1.0, 2, 2).validate().is_ok());
        println!("[PASS] test_params_reject_small_fanout");
    }

    #[test]
    fn test_params_serialization_roundtrip() {
        let params = CfTreeParams::new(3.5, 20, 7);
        let json = serde_json::to_string(&params).expect("serialize");
        let restored: CfTreeParams = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(params, restored);

        let partial: CfTreeParams = serde_json::from_str(r#"{"threshold": 2.0}"#).expect("partial");
        assert_eq!(partial.max_entries, 100, "missing fields fall back to defaults");
        println!("[PASS] test_params_serialization_roundtrip - JSON: {}", json);
    }

    #[test]
    fn test_new_rejects_zero_dimension() {
        assert!(CfTree::new(CfTreeParams::default(), 0).is_err());
        println!("[PASS] test_new_rejects_zero_dimension");
    }

    // =========================================================================
    // INSERTION TESTS
    // =========================================================================

    #[test]
    fn test_empty_tree_has_no_centers() {
        let tree = CfTree::new(CfTreeParams::default(), 3).unwrap();
        assert!(tree.output_centers().is_empty());
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.total_points(), 0);
        println!("[PASS] test_empty_tree_has_no_centers");
    }

    #[test]
    fn test_absorb_below_threshold() {
        let mut tree = CfTree::new(CfTreeParams::default().with_threshold(1.5), 2).unwrap();
        tree.insert(&pt(&[0.0, 0.0], 1));
        tree.insert(&pt(&[1.0, 0.0], 2));

        let entries: Vec<_> = tree.leaf_entries().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].n, 2);
        assert_eq!(entries[0].centroid(), vec![0.5, 0.0]);
        println!("[PASS] test_absorb_below_threshold");
    }

    #[test]
    fn test_distance_equal_to_threshold_is_not_absorbed() {
        let mut tree = CfTree::new(CfTreeParams::default().with_threshold(1.0), 1).unwrap();
        tree.insert(&pt(&[0.0], 1));
        tree.insert(&pt(&[1.0], 2));
        assert_eq!(tree.leaf_entries().count(), 2);
        println!("[PASS] test_distance_equal_to_threshold_is_not_absorbed");
    }

    #[test]
    fn test_conservation_without_splits() {
        let mut tree = CfTree::new(CfTreeParams::new(0.5, 1000, 50), 2).unwrap();
        let n = 300;
        for i in 0..n {
            let x = (i % 17) as f64 * 3.0;
            let y = (i % 5) as f64 * 0.1;
            tree.insert(&pt(&[x, y], i));
        }

        assert_eq!(tree.split_count(), 0);
        let total: u64 = tree.leaf_entries().map(|cf| cf.n).sum();
        assert_eq!(total, n);
        println!("[PASS] test_conservation_without_splits - total={}", total);
    }

    // =========================================================================
    // SPLIT TESTS
    // =========================================================================

    #[test]
    fn test_leaf_overflow_triggers_exactly_one_split() {
        let max_entries = 4;
        let mut tree = CfTree::new(CfTreeParams::new(1.0, max_entries, 50), 1).unwrap();
        let coords: Vec<f64> = (0..=max_entries).map(|i| i as f64 * 100.0).collect();
        for (i, &x) in coords.iter().enumerate() {
            tree.insert(&pt(&[x], i as u64));
        }

        assert_eq!(tree.split_count(), 1);
        let root = tree.node(tree.root());
        assert!(!root.is_leaf);
        assert_eq!(root.children.len(), 2);

        let left = tree.node(root.children[0]);
        let right = tree.node(root.children[1]);
        assert!(left.is_leaf && right.is_leaf);
        assert_eq!(left.len() + right.len(), max_entries + 1);

        let mut seen: Vec<f64> = left
            .entries
            .iter()
            .chain(right.entries.iter())
            .map(|cf| cf.centroid()[0])
            .collect();
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(seen, coords, "halves must partition the original entries");

        // Back half moved to the sibling
        assert_eq!(left.entries[0].centroid(), vec![0.0]);
        assert_eq!(right.entries.last().unwrap().centroid(), vec![400.0]);
        println!(
            "[PASS] test_leaf_overflow_triggers_exactly_one_split - left={}, right={}",
            left.len(),
            right.len()
        );
    }

    #[test]
    fn test_split_digests_summarize_children() {
        let mut tree = CfTree::new(CfTreeParams::new(1.0, 3, 50), 1).unwrap();
        for i in 0..20u64 {
            tree.insert(&pt(&[i as f64 * 10.0], i));
        }

        for (idx, node) in (0..tree.node_count()).map(|i| (i, tree.node(NodeId(i)))) {
            if node.is_leaf {
                continue;
            }
            for (digest, &child) in node.entries.iter().zip(node.children.iter()) {
                let actual = tree.node(child).summary(1);
                assert_eq!(digest.n, actual.n, "digest count mismatch at node {}", idx);
                assert!((digest.linear_sum[0] - actual.linear_sum[0]).abs() < 1e-9);
                assert_eq!(tree.node(child).parent, Some(NodeId(idx)));
            }
        }
        let total: u64 = tree.leaf_entries().map(|cf| cf.n).sum();
        assert_eq!(total, 20);
        println!("[PASS] test_split_digests_summarize_children - nodes={}", tree.node_count());
    }

    #[test]
    fn test_internal_overflow_cascades() {
        let mut tree = CfTree::new(CfTreeParams::new(0.5, 2, 2), 1).unwrap();
        for i in 0..40u64 {
            tree.insert(&pt(&[i as f64 * 10.0], i));
        }

        for i in 0..tree.node_count() {
            let node = tree.node(NodeId(i));
            if node.is_leaf {
                assert!(node.len() <= 2);
            } else {
                assert!(node.children.len() <= 2);
                assert_eq!(node.children.len(), node.entries.len());
            }
        }
        assert!(tree.depth() > 2);
        assert_eq!(tree.leaf_entries().count(), 40);
        println!("[PASS] test_internal_overflow_cascades - depth={}", tree.depth());
    }

    #[test]
    fn test_routes_to_closest_subtree() {
        let mut tree = CfTree::new(CfTreeParams::new(1.0, 2, 50), 1).unwrap();
        tree.insert(&pt(&[0.0], 1));
        tree.insert(&pt(&[100.0], 2));
        tree.insert(&pt(&[200.0], 3));
        // Root split: left leaf holds [0, 100], right leaf holds [200]
        tree.insert(&pt(&[200.5], 4));

        let root = tree.node(tree.root());
        let right = tree.node(root.children[1]);
        assert_eq!(right.entries.len(), 1);
        assert_eq!(right.entries[0].n, 2);
        println!("[PASS] test_routes_to_closest_subtree");
    }
}
