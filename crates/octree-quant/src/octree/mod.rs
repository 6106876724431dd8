//! Adaptive octree color clustering.
//!
//! Every sample walks down the tree one bit per channel per level, so the
//! eight children of a node split its color cube in half along R, G and B.
//! Leaves accumulate pixel counts and channel sums; reducing the tree folds
//! a node's children back into it, shrinking the number of clusters by
//! `children - 1` per step.
//!
//! Nodes live in an arena and refer to their children by index. Non-leaf
//! nodes are also pushed onto a per-level stack at creation time, which makes
//! picking the next reduction candidate (deepest level, most recent node)
//! constant time.

mod quantizer;

pub use quantizer::{OctreeQuantizer, PaletteQuantizer};

use crate::bits::IndexDepth;
use crate::color::Rgb;

/// Index of a node inside the arena.
pub type NodeId = usize;

#[derive(Debug, Clone, Default)]
struct Node {
    leaf: bool,
    pixel_count: u64,
    red_sum: u64,
    green_sum: u64,
    blue_sum: u64,
    children: [Option<NodeId>; 8],
}

impl Node {
    fn accumulate(&mut self, rgb: Rgb) {
        self.pixel_count += 1;
        self.red_sum += rgb.r as u64;
        self.green_sum += rgb.g as u64;
        self.blue_sum += rgb.b as u64;
    }
}

/// Pixel count and channel sums of one color cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafSummary {
    pub pixel_count: u64,
    pub red_sum: u64,
    pub green_sum: u64,
    pub blue_sum: u64,
}

impl LeafSummary {
    /// Mean color of the cluster (truncating division).
    pub fn average(&self) -> Rgb {
        if self.pixel_count == 0 {
            return Rgb::BLACK;
        }
        Rgb::new(
            (self.red_sum / self.pixel_count) as u8,
            (self.green_sum / self.pixel_count) as u8,
            (self.blue_sum / self.pixel_count) as u8,
        )
    }
}

/// Octree over RGB samples with ordered, deepest-first reduction.
#[derive(Debug, Clone)]
pub struct OctreeColorTree {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    root: Option<NodeId>,
    /// Non-leaf nodes per level, most recently created last.
    reducible: Vec<Vec<NodeId>>,
    leaf_count: usize,
    color_bits: u8,
}

impl OctreeColorTree {
    /// Create an empty tree that splits down to `depth.bits()` levels.
    pub fn new(depth: IndexDepth) -> Self {
        let color_bits = depth.bits() as u8;
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            reducible: vec![Vec::new(); color_bits as usize],
            leaf_count: 0,
            color_bits,
        }
    }

    /// Number of leaves (color clusters) currently in the tree.
    #[inline]
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    #[inline]
    pub fn color_bits(&self) -> u8 {
        self.color_bits
    }

    fn alloc(&mut self, level: u8) -> NodeId {
        let leaf = level == self.color_bits;
        let node = Node {
            leaf,
            ..Node::default()
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id] = node;
                id
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        if leaf {
            self.leaf_count += 1;
        } else {
            self.reducible[level as usize].push(id);
        }
        id
    }

    /// Insert one sample, creating nodes down to the first leaf on its path.
    pub fn add_color(&mut self, rgb: Rgb) {
        let mut id = match self.root {
            Some(id) => id,
            None => {
                let id = self.alloc(0);
                self.root = Some(id);
                id
            }
        };
        let mut level = 0u8;
        loop {
            if self.nodes[id].leaf {
                self.nodes[id].accumulate(rgb);
                return;
            }
            let slot = child_index(rgb, level);
            id = match self.nodes[id].children[slot] {
                Some(child) => child,
                None => {
                    let child = self.alloc(level + 1);
                    self.nodes[id].children[slot] = Some(child);
                    child
                }
            };
            level += 1;
        }
    }

    /// Merge the most recently created non-leaf node of the deepest
    /// non-empty level into a leaf.
    ///
    /// Returns `false` when there is nothing left to reduce.
    pub fn reduce(&mut self) -> bool {
        let Some(id) = self
            .reducible
            .iter_mut()
            .rev()
            .find_map(|stack| stack.pop())
        else {
            return false;
        };

        let children = std::mem::take(&mut self.nodes[id].children);
        let mut merged = 0;
        for child in children.into_iter().flatten() {
            let Node {
                pixel_count,
                red_sum,
                green_sum,
                blue_sum,
                ..
            } = self.nodes[child];
            let node = &mut self.nodes[id];
            node.pixel_count += pixel_count;
            node.red_sum += red_sum;
            node.green_sum += green_sum;
            node.blue_sum += blue_sum;
            self.free.push(child);
            merged += 1;
        }

        self.nodes[id].leaf = true;
        self.leaf_count = self.leaf_count + 1 - merged;
        true
    }

    /// Leaves in depth-first order, children visited 0 through 7.
    pub fn leaves(&self) -> Vec<LeafSummary> {
        let mut leaves = Vec::with_capacity(self.leaf_count);
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.leaf {
                leaves.push(LeafSummary {
                    pixel_count: node.pixel_count,
                    red_sum: node.red_sum,
                    green_sum: node.green_sum,
                    blue_sum: node.blue_sum,
                });
            } else {
                stack.extend(node.children.iter().rev().flatten());
            }
        }
        leaves
    }
}

/// Child slot for `rgb` at `level`: one bit from each channel, R highest.
#[inline]
fn child_index(rgb: Rgb, level: u8) -> usize {
    let shift = 7 - level;
    ((((rgb.r >> shift) & 1) << 2) | (((rgb.g >> shift) & 1) << 1) | ((rgb.b >> shift) & 1))
        as usize
}
