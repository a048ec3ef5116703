//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! The tree is an arena of nodes addressed by index. Construction walks an
//! explicit worklist instead of recursing, and splits every node on a fixed
//! grid of cut planes, keeping the cut whose two tightened child boxes have
//! the smallest total volume.
//!
//! Once [`Bvh::build`] returns the tree is immutable; traversal lives in
//! `traversal.rs`.

use rtv_core::Triangle;
use rtv_math::Aabb;
use serde::{Deserialize, Serialize};

/// Maximum triangles per leaf node before splitting.
pub const DEFAULT_MAX_MEMBERS: usize = 16;

/// Nodes deeper than this (root = 0) always become leaves.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Cut planes per axis are placed at `1/n, 2/n, .., (n-1)/n`.
pub const DEFAULT_SPLITS_PER_AXIS: usize = 4;

/// BVH construction settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BvhConfig {
    pub max_members: usize,
    pub max_depth: usize,
    pub splits_per_axis: usize,
}

impl Default for BvhConfig {
    fn default() -> Self {
        Self {
            max_members: DEFAULT_MAX_MEMBERS,
            max_depth: DEFAULT_MAX_DEPTH,
            splits_per_axis: DEFAULT_SPLITS_PER_AXIS,
        }
    }
}

/// BVH node - either a branch with two children or a leaf with triangles.
#[derive(Debug, Clone)]
pub struct BvhNode {
    pub bbox: Aabb,
    /// Distance from the root (root = 0)
    pub depth: usize,
    children: Option<[usize; 2]>,
    /// Triangle indices; empty for branches
    members: Vec<usize>,
}

impl BvhNode {
    fn new(bbox: Aabb, depth: usize) -> Self {
        Self {
            bbox,
            depth,
            children: None,
            members: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Indices of the two children in the node arena.
    pub fn children(&self) -> Option<[usize; 2]> {
        self.children
    }

    /// Indices of the triangles held by a leaf.
    pub fn members(&self) -> &[usize] {
        &self.members
    }
}

/// Shape of a built tree, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BvhStats {
    pub triangles: usize,
    pub nodes: usize,
    pub leaves: usize,
    pub max_depth: usize,
    pub largest_leaf: usize,
}

/// Bounding volume hierarchy over an owned triangle list.
#[derive(Debug, Clone)]
pub struct Bvh {
    pub(crate) nodes: Vec<BvhNode>,
    pub(crate) triangles: Vec<Triangle>,
}

/// Pending node in the construction worklist.
struct WorkItem {
    node: usize,
    members: Vec<usize>,
    depth: usize,
}

/// One side of a split candidate, already tightened to its members.
struct Side {
    bbox: Aabb,
    members: Vec<usize>,
}

impl Side {
    fn tight(triangles: &[Triangle], members: Vec<usize>) -> Self {
        let bbox = members
            .iter()
            .fold(Aabb::EMPTY, |acc, &i| Aabb::surrounding(&acc, &triangles[i].bounds()));
        Self { bbox, members }
    }
}

impl Bvh {
    /// Build a BVH with the default split resolution.
    pub fn build(triangles: Vec<Triangle>, max_members: usize, max_depth: usize) -> Self {
        Self::build_with(
            triangles,
            &BvhConfig {
                max_members,
                max_depth,
                ..BvhConfig::default()
            },
        )
    }

    /// Build a BVH from a list of triangles.
    pub fn build_with(triangles: Vec<Triangle>, config: &BvhConfig) -> Self {
        let root_box = triangles
            .iter()
            .fold(Aabb::EMPTY, |acc, tri| Aabb::surrounding(&acc, &tri.bounds()));
        log::info!(
            "BVH root box from {:?} to {:?} ({} triangles)",
            root_box.min,
            root_box.max,
            triangles.len()
        );

        let mut nodes = vec![BvhNode::new(root_box, 0)];
        let mut stack = vec![WorkItem {
            node: 0,
            members: (0..triangles.len()).collect(),
            depth: 0,
        }];

        while let Some(item) = stack.pop() {
            if item.members.len() <= config.max_members || item.depth > config.max_depth {
                log::trace!(
                    "leaf node: {} members, depth {}, volume {}",
                    item.members.len(),
                    item.depth,
                    nodes[item.node].bbox.volume()
                );
                nodes[item.node].members = item.members;
                continue;
            }

            let (bbox, splits) = (nodes[item.node].bbox, config.splits_per_axis);
            let Some((left, right)) = split(&triangles, &bbox, &item.members, splits) else {
                log::debug!(
                    "no usable split for {} members at depth {}; keeping a leaf",
                    item.members.len(),
                    item.depth
                );
                nodes[item.node].members = item.members;
                continue;
            };

            let depth = item.depth + 1;
            let left_index = nodes.len();
            nodes.push(BvhNode::new(left.bbox, depth));
            nodes.push(BvhNode::new(right.bbox, depth));
            nodes[item.node].children = Some([left_index, left_index + 1]);

            stack.push(WorkItem {
                node: left_index,
                members: left.members,
                depth,
            });
            stack.push(WorkItem {
                node: left_index + 1,
                members: right.members,
                depth,
            });
        }

        let bvh = Self { nodes, triangles };
        log::info!("BVH built: {:?}", bvh.stats());
        bvh
    }

    /// The root node (index 0).
    pub fn root(&self) -> &BvhNode {
        &self.nodes[0]
    }

    pub fn node(&self, index: usize) -> &BvhNode {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn bounds(&self) -> Aabb {
        self.root().bbox
    }

    pub fn stats(&self) -> BvhStats {
        let mut stats = BvhStats {
            triangles: self.triangles.len(),
            nodes: self.nodes.len(),
            ..BvhStats::default()
        };
        for node in self.nodes.iter().filter(|n| n.is_leaf()) {
            stats.leaves += 1;
            stats.max_depth = stats.max_depth.max(node.depth);
            stats.largest_leaf = stats.largest_leaf.max(node.members.len());
        }
        stats
    }
}

/// Try every cut plane on the grid and return the pair of non-empty,
/// tightened children with the smallest summed volume.
///
/// A triangle goes left if any of its vertices lies in the left candidate box,
/// otherwise right if any vertex lies in the right box. Ties between equal
/// scores keep the earliest candidate.
fn split(
    triangles: &[Triangle],
    bbox: &Aabb,
    members: &[usize],
    splits_per_axis: usize,
) -> Option<(Side, Side)> {
    let mut best: Option<(f32, Side, Side)> = None;

    for axis in 0..3 {
        for k in 1..splits_per_axis {
            let fraction = k as f32 / splits_per_axis as f32;
            let (left_box, right_box) = bbox.divide(axis, fraction);

            let mut left = Vec::new();
            let mut right = Vec::new();
            for &index in members {
                let tri = &triangles[index];
                if tri.touches(&left_box) {
                    left.push(index);
                } else if tri.touches(&right_box) {
                    right.push(index);
                } else {
                    log::warn!(
                        "triangle {} in neither box (axis {}, fraction {}); dropped from candidate",
                        index,
                        axis,
                        fraction
                    );
                }
            }

            if left.is_empty() || right.is_empty() {
                continue;
            }

            let left = Side::tight(triangles, left);
            let right = Side::tight(triangles, right);
            let score = left.bbox.volume() + right.bbox.volume();

            if best.as_ref().map_or(true, |(best_score, _, _)| score < *best_score) {
                best = Some((score, left, right));
            }
        }
    }

    best.map(|(_, left, right)| (left, right))
}
