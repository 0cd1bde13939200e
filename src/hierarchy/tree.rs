//! Vocabulary tree structure.
//!
//! A K-ary tree of depth L whose nodes hold cluster centroids. Each leaf is
//! reached by a unique path of child indices `d₁ d₂ … d_L` from the root; the
//! leaf's codeword id is that path read as a base-K number with `d₁` as the
//! most significant digit:
//!
//! ```text
//! id = d₁·K^(L-1) + d₂·K^(L-2) + … + d_L
//! ```
//!
//! Trees built from small sample pools can stop above the leaf level or carry
//! fewer than K children. A path that ends early is padded with zero digits,
//! so [`VocabularyTree::flatten`] and [`VocabularyTree::leaf_index`] always
//! agree on where such a leaf lives. Ids no leaf maps to stay empty.

use super::node::TreeNode;
use crate::codebook::Codebook;
use crate::error::{Error, Result};
use crate::vector::{check_dim, nearest};
use ndarray::{Array1, Array2, ArrayView1};

/// A hierarchical vocabulary.
///
/// Equality is structural: two trees are equal when they have the same
/// shape and centroids in pre-order, whatever their arena layout.
#[derive(Debug, Clone)]
pub struct VocabularyTree {
    /// Branching factor K.
    branching: usize,
    /// Depth L (levels below the root).
    depth: usize,
    /// Dimension of every centroid.
    dim: usize,
    /// Node arena; index 0 is the root.
    nodes: Vec<TreeNode>,
    /// K^L.
    leaf_count: usize,
}

impl VocabularyTree {
    /// Create a tree holding only its root.
    pub fn new(branching: usize, depth: usize, dim: usize) -> Result<Self> {
        if branching == 0 {
            return Err(Error::InvalidParameter {
                name: "branching",
                message: "must be at least 1",
            });
        }
        if depth == 0 {
            return Err(Error::InvalidParameter {
                name: "depth",
                message: "must be at least 1",
            });
        }
        if dim == 0 {
            return Err(Error::InvalidParameter {
                name: "dimension",
                message: "centroids must have at least one component",
            });
        }
        let leaf_count = u32::try_from(depth)
            .ok()
            .and_then(|l| branching.checked_pow(l))
            .ok_or(Error::InvalidParameter {
                name: "depth",
                message: "branching^depth leaves overflow usize",
            })?;

        Ok(Self {
            branching,
            depth,
            dim,
            nodes: vec![TreeNode::root()],
            leaf_count,
        })
    }

    /// Branching factor K.
    pub fn branching(&self) -> usize {
        self.branching
    }

    /// Depth L.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Centroid dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Size of the leaf id space, K^L.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the root has no children.
    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    /// The root node.
    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    /// Node by arena id.
    pub fn node(&self, id: usize) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    /// All nodes in arena order (root first).
    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter()
    }

    /// Children of `id`, in cluster order.
    pub fn children(&self, id: usize) -> impl Iterator<Item = &TreeNode> {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&c| &self.nodes[c])
    }

    /// Attach a child with `centroid` under `parent` and return its id.
    pub fn add_child(&mut self, parent: usize, centroid: Array1<f64>) -> Result<usize> {
        check_dim(self.dim, centroid.len())?;
        let parent_node = self.nodes.get(parent).ok_or(Error::InvalidParameter {
            name: "parent",
            message: "no such node",
        })?;
        if parent_node.depth >= self.depth {
            return Err(Error::InvalidParameter {
                name: "parent",
                message: "node is already at the leaf level",
            });
        }
        if parent_node.children.len() >= self.branching {
            return Err(Error::InvalidParameter {
                name: "parent",
                message: "node already has K children",
            });
        }

        let id = self.nodes.len();
        let depth = parent_node.depth + 1;
        self.nodes.push(TreeNode::child(id, centroid, depth));
        self.nodes[parent].children.push(id);
        Ok(id)
    }

    /// Leaf id for a (possibly short) path of child indices.
    pub fn leaf_position(&self, digits: &[usize]) -> usize {
        debug_assert!(digits.len() <= self.depth);
        (0..self.depth).fold(0, |acc, level| {
            acc * self.branching + digits.get(level).copied().unwrap_or(0)
        })
    }

    /// Greedy descent: nearest child at every level, until a leaf.
    ///
    /// Returns the child index chosen at each level. This is not necessarily
    /// the path to the globally nearest leaf.
    pub fn descend(&self, query: ArrayView1<'_, f64>) -> Result<Vec<usize>> {
        check_dim(self.dim, query.len())?;
        Ok(self.path_of(query))
    }

    /// Leaf id reached by greedy descent from the root.
    pub fn leaf_index(&self, query: ArrayView1<'_, f64>) -> Result<usize> {
        check_dim(self.dim, query.len())?;
        Ok(self.locate(query))
    }

    /// [`VocabularyTree::leaf_index`] for a query whose dimension the caller
    /// has already checked.
    pub(crate) fn locate(&self, query: ArrayView1<'_, f64>) -> usize {
        debug_assert_eq!(query.len(), self.dim);
        self.leaf_position(&self.path_of(query))
    }

    fn path_of(&self, query: ArrayView1<'_, f64>) -> Vec<usize> {
        let mut path = Vec::with_capacity(self.depth);
        let mut node = &self.nodes[0];
        while let Some((digit, _)) = nearest(query, self.children(node.id).map(TreeNode::value)) {
            path.push(digit);
            node = &self.nodes[node.children[digit]];
        }
        path
    }

    /// Non-root nodes in pre-order (each node before its children, children
    /// in cluster order).
    pub fn pre_order(&self) -> Vec<&TreeNode> {
        let mut out = Vec::with_capacity(self.nodes.len().saturating_sub(1));
        let mut stack: Vec<usize> = self.nodes[0].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Leaves (childless non-root nodes) with their paths, in pre-order.
    pub fn leaves(&self) -> Vec<(Vec<usize>, &TreeNode)> {
        let mut out = Vec::new();
        let mut stack: Vec<(usize, Vec<usize>)> = vec![(0, Vec::new())];
        while let Some((id, path)) = stack.pop() {
            let node = &self.nodes[id];
            if node.is_leaf() {
                if !node.is_root() {
                    out.push((path, node));
                }
                continue;
            }
            for (digit, &child) in node.children.iter().enumerate().rev() {
                let mut child_path = path.clone();
                child_path.push(digit);
                stack.push((child, child_path));
            }
        }
        out
    }

    /// Linearize the leaves into a codebook of K^L codewords.
    ///
    /// Row `i` holds the centroid of the leaf whose path encodes `i`; ids with
    /// no leaf are zero vectors.
    pub fn flatten(&self) -> Result<Codebook> {
        let mut centroids = Array2::<f64>::zeros((self.leaf_count, self.dim));
        for (path, leaf) in self.leaves() {
            centroids
                .row_mut(self.leaf_position(&path))
                .assign(&leaf.centroid);
        }
        Codebook::new(centroids)
    }
}

impl PartialEq for VocabularyTree {
    fn eq(&self, other: &Self) -> bool {
        if self.branching != other.branching
            || self.depth != other.depth
            || self.dim != other.dim
            || self.nodes.len() != other.nodes.len()
        {
            return false;
        }
        self.pre_order()
            .into_iter()
            .zip(other.pre_order())
            .all(|(a, b)| {
                a.depth == b.depth && a.children.len() == b.children.len() && a.centroid == b.centroid
            })
    }
}
