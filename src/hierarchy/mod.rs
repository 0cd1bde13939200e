//! Hierarchical vocabularies.
//!
//! # The Core Insight
//!
//! Hard assignment against a flat codebook costs one distance per codeword.
//! With tens of thousands of codewords that dominates encoding time. A
//! **vocabulary tree** arranges the codewords as the leaves of a K-ary tree
//! of depth L, so a lookup only compares against K children per level:
//!
//! ```text
//! Codewords │ Flat lookup │ Tree lookup (K=10)
//! ──────────┼─────────────┼───────────────────
//!       100 │         100 │   20
//!    10 000 │      10 000 │   40
//! 1 000 000 │   1 000 000 │   60
//! ```
//!
//! The price is that the descent is greedy: the leaf it reaches is not always
//! the globally nearest one.
//!
//! # Structure
//!
//! ```text
//!                     [root]                K = 2, L = 2
//!                   /        \
//! level 2:     [c₀]            [c₁]
//!              /  \            /  \
//! level 1:  [c₀₀] [c₀₁]    [c₁₀] [c₁₁]     leaf ids 0, 1, 2, 3
//! ```
//!
//! Nodes are stored in an arena ([`VocabularyTree`]) and refer to children
//! by id. A node may hold fewer than K children when its training pool was
//! too small to split; readers and the quantizer accept that.
//!
//! # Module Overview
//!
//! - [`hierarchical_kmeans`]: build a tree by recursive k-means
//! - [`VocabularyTree::flatten`]: linearize the leaves into a [`crate::Codebook`]
//! - [`VocabularyTree::read_from`] / [`VocabularyTree::write_to`]: text format
//! - [`validate_tree`]: structural health check
//!
//! # References
//!
//! - Nistér, Stewénius (2006). "Scalable Recognition with a Vocabulary Tree." CVPR.

mod builder;
mod format;
mod node;
pub mod tree;
mod validate;

pub use builder::{hierarchical_kmeans, TreeConfig};
pub use node::TreeNode;
pub use tree::VocabularyTree;
pub use validate::{validate_tree, Severity, ValidationIssue, ValidationReport};
