//! Hierarchical k-means.
//!
//! Builds a [`VocabularyTree`] top-down (Nistér & Stewénius, 2006):
//! 1. Cluster the pool into K groups with k-means
//! 2. Make each centroid a child of the current node
//! 3. Recurse into each group with one level less
//!
//! A pool with at most K samples cannot be split further. Its samples are
//! attached directly as childless nodes, which leaves that subtree shorter
//! (and possibly narrower) than the rest of the tree.
//!
//! ## References
//!
//! Nistér, Stewénius (2006). "Scalable Recognition with a Vocabulary Tree." CVPR.

use super::tree::VocabularyTree;
use crate::cluster::Kmeans;
use crate::error::Result;
use crate::vector::stack_rows;
use ndarray::{Array2, Axis};
use rand::Rng;
use tracing::{debug, info};

/// Configuration for building a vocabulary tree.
#[derive(Debug, Clone)]
pub struct TreeConfig {
    /// Branching factor K (clusters per node).
    pub branching: usize,
    /// Depth L (levels below the root). Must be at least 1.
    pub depth: usize,
    /// K-means iteration cap at each node.
    pub max_iter: usize,
    /// K-means tolerance on the squared centroid shift.
    pub tol: f64,
    /// K-means trials at each node.
    pub trials: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            branching: 5,
            depth: 4,
            max_iter: 15,
            tol: 1e-4,
            trials: 1,
        }
    }
}

impl TreeConfig {
    /// Create a new tree configuration.
    pub fn new(branching: usize, depth: usize) -> Self {
        Self {
            branching,
            depth,
            ..Self::default()
        }
    }

    /// Set branching factor.
    pub fn with_branching(mut self, branching: usize) -> Self {
        self.branching = branching;
        self
    }

    /// Set depth.
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Set per-node iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set per-node convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set per-node trial count.
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    fn kmeans(&self) -> Kmeans {
        Kmeans::new(self.branching)
            .with_max_iter(self.max_iter)
            .with_tol(self.tol)
            .with_trials(self.trials)
    }
}

/// Build a vocabulary tree from a training pool.
pub fn hierarchical_kmeans<R: Rng + ?Sized>(
    corpus: &[Vec<f64>],
    config: &TreeConfig,
    rng: &mut R,
) -> Result<VocabularyTree> {
    let data = stack_rows(corpus)?;
    let mut tree = VocabularyTree::new(config.branching, config.depth, data.ncols())?;

    let members: Vec<usize> = (0..data.nrows()).collect();
    let mut builder = Builder {
        data: &data,
        tree: &mut tree,
        kmeans: config.kmeans(),
    };
    builder.grow(0, &members, config.depth, rng)?;

    info!(
        branching = config.branching,
        depth = config.depth,
        nodes = tree.len(),
        samples = corpus.len(),
        "built vocabulary tree"
    );
    Ok(tree)
}

struct Builder<'a> {
    data: &'a Array2<f64>,
    tree: &'a mut VocabularyTree,
    kmeans: Kmeans,
}

impl Builder<'_> {
    fn grow<R: Rng + ?Sized>(
        &mut self,
        parent: usize,
        members: &[usize],
        levels: usize,
        rng: &mut R,
    ) -> Result<()> {
        if levels == 0 || members.is_empty() {
            return Ok(());
        }

        let k = self.tree.branching();
        if members.len() <= k {
            debug!(
                parent,
                samples = members.len(),
                levels_left = levels,
                "pool too small to split, attaching samples as leaves"
            );
            for &i in members {
                self.tree.add_child(parent, self.data.row(i).to_owned())?;
            }
            return Ok(());
        }

        let pool = self.data.select(Axis(0), members);
        let fit = self.kmeans.fit_matrix(&pool, rng)?;

        for cluster in 0..k {
            let child = self.tree.add_child(parent, fit.centroid(cluster).to_owned())?;
            let subset: Vec<usize> = fit.members(cluster).into_iter().map(|j| members[j]).collect();
            self.grow(child, &subset, levels - 1, rng)?;
        }
        Ok(())
    }
}
