//! Vocabulary tree node.

use core::fmt;
use ndarray::{Array1, ArrayView1};

/// A node of a [`VocabularyTree`](super::VocabularyTree).
///
/// Nodes live in an arena owned by the tree and refer to their children by
/// id. The root carries an empty centroid.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    /// Arena id (0 is the root).
    pub id: usize,
    /// Cluster centroid this node stands for.
    pub centroid: Array1<f64>,
    /// Distance from the root (root = 0, leaves of a full tree = L).
    pub depth: usize,
    /// Child ids in cluster order. May hold fewer than K entries.
    pub children: Vec<usize>,
}

impl TreeNode {
    pub(crate) fn root() -> Self {
        Self {
            id: 0,
            centroid: Array1::zeros(0),
            depth: 0,
            children: Vec::new(),
        }
    }

    pub(crate) fn child(id: usize, centroid: Array1<f64>, depth: usize) -> Self {
        Self {
            id,
            centroid,
            depth,
            children: Vec::new(),
        }
    }

    /// Whether this is the root.
    pub fn is_root(&self) -> bool {
        self.depth == 0
    }

    /// Whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The centroid as a view.
    pub fn value(&self) -> ArrayView1<'_, f64> {
        self.centroid.view()
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "Root[{} children]", self.children.len());
        }
        write!(
            f,
            "Node[{}] depth {} ({} children, dim {})",
            self.id,
            self.depth,
            self.children.len(),
            self.centroid.len()
        )
    }
}
