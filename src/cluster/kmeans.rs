//! K-means clustering.
//!
//! Partitions a corpus of feature vectors into k clusters by minimizing the
//! **within-cluster sum of squares**. The centroids it produces are the
//! codewords of a visual vocabulary.
//!
//! # Lloyd's Algorithm
//!
//! 1. Seed k centroids with k distinct corpus samples
//! 2. **Assign**: each sample → nearest centroid (ties go to the lower index)
//! 3. **Update**: each centroid → mean of its assigned samples
//! 4. Repeat until nothing moves, the iteration cap is hit, or the largest
//!    squared centroid shift drops below `tol`
//!
//! # Incremental Sums
//!
//! Each cluster keeps a running sum of its members. Only samples that change
//! cluster touch those sums, so late iterations (where few samples move) cost
//! O(changed · d) for the update instead of O(n · d).
//!
//! # Empty Clusters
//!
//! A cluster that loses all of its members is reseeded with a uniformly
//! random corpus sample. The new centroid is not guaranteed to differ from
//! the other centroids.
//!
//! # Multiple Trials
//!
//! Lloyd only finds a local minimum. With `trials > 1` the algorithm is run
//! from independent random seedings and the fit with the lowest compactness
//! is kept. Per-trial seeds are drawn from the caller's RNG before any trial
//! starts, so the result does not depend on how trials are scheduled.
//!
//! # Compactness
//!
//! ```text
//! compactness = (1/n) Σᵢ ||xᵢ - μ(xᵢ)||²
//! ```
//!
//! the mean squared distance from each sample to its final centroid.

use super::traits::Clustering;
use crate::error::{Error, Result};
use crate::vector::{add_assign, nearest, squared_distance, stack_rows, sub_assign};
use ndarray::{Array2, ArrayView1, Axis};
use rand::prelude::*;
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// K-means clustering algorithm.
#[derive(Debug, Clone)]
pub struct Kmeans {
    /// Number of clusters.
    k: usize,
    /// Maximum iterations per trial.
    max_iter: usize,
    /// Convergence tolerance on the largest squared centroid shift.
    tol: f64,
    /// Independent restarts; the most compact one wins.
    trials: usize,
    /// Random seed used by [`Kmeans::fit`].
    seed: Option<u64>,
}

/// Result of a k-means run.
#[derive(Debug, Clone)]
pub struct KmeansFit {
    /// Cluster of each input sample, in input order.
    pub labels: Vec<usize>,
    /// One centroid per row.
    pub centroids: Array2<f64>,
    /// Number of samples assigned to each cluster.
    pub sizes: Vec<usize>,
    /// Mean squared distance between each sample and its centroid.
    pub compactness: f64,
    /// Iterations the run took.
    pub iterations: usize,
}

impl KmeansFit {
    /// Number of clusters.
    pub fn k(&self) -> usize {
        self.centroids.nrows()
    }

    /// Centroid of `cluster`.
    pub fn centroid(&self, cluster: usize) -> ArrayView1<'_, f64> {
        self.centroids.row(cluster)
    }

    /// Indices of the samples assigned to `cluster`, in input order.
    pub fn members(&self, cluster: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter_map(|(i, &label)| (label == cluster).then_some(i))
            .collect()
    }

    /// Centroids as owned vectors, in cluster order.
    pub fn centroid_vecs(&self) -> Vec<Vec<f64>> {
        self.centroids.rows().into_iter().map(|r| r.to_vec()).collect()
    }
}

impl Kmeans {
    /// Create a new K-means clusterer.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 30,
            tol: 1e-4,
            trials: 1,
            seed: None,
        }
    }

    /// Set maximum iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set convergence tolerance (squared centroid shift).
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the number of independent trials.
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of clusters.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Maximum iterations per trial.
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// Convergence tolerance.
    pub fn tol(&self) -> f64 {
        self.tol
    }

    /// Number of trials.
    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Cluster `data`, seeding from the configured seed (or the thread RNG).
    pub fn fit(&self, data: &[Vec<f64>]) -> Result<KmeansFit> {
        match self.seed {
            Some(s) => self.fit_with_rng(data, &mut StdRng::seed_from_u64(s)),
            None => self.fit_with_rng(data, &mut rand::rng()),
        }
    }

    /// Cluster `data` with an explicit random source, keeping the most compact trial.
    pub fn fit_with_rng<R: Rng + ?Sized>(&self, data: &[Vec<f64>], rng: &mut R) -> Result<KmeansFit> {
        let matrix = stack_rows(data)?;
        self.fit_matrix(&matrix, rng)
    }

    /// Run every trial and return all of them, in trial order.
    pub fn fit_trials_with_rng<R: Rng + ?Sized>(
        &self,
        data: &[Vec<f64>],
        rng: &mut R,
    ) -> Result<Vec<KmeansFit>> {
        let matrix = stack_rows(data)?;
        self.run_trials(&matrix, rng)
    }

    /// Cluster the rows of an already validated matrix.
    pub(crate) fn fit_matrix<R: Rng + ?Sized>(&self, data: &Array2<f64>, rng: &mut R) -> Result<KmeansFit> {
        let fits = self.run_trials(data, rng)?;

        let mut best: Option<KmeansFit> = None;
        for (trial, fit) in fits.into_iter().enumerate() {
            if self.trials > 1 {
                info!(
                    trial,
                    compactness = fit.compactness,
                    iterations = fit.iterations,
                    "k-means trial finished"
                );
            }
            // Strict less-than: the first of equally compact trials wins.
            if best
                .as_ref()
                .map_or(true, |b| fit.compactness < b.compactness)
            {
                best = Some(fit);
            }
        }
        best.ok_or(Error::InvalidParameter {
            name: "trials",
            message: "must be at least 1",
        })
    }

    fn validate(&self, n: usize) -> Result<()> {
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if self.k == 0 || self.k > n {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: n,
            });
        }
        if self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iter",
                message: "must be at least 1",
            });
        }
        if self.trials == 0 {
            return Err(Error::InvalidParameter {
                name: "trials",
                message: "must be at least 1",
            });
        }
        if !(self.tol >= 0.0) {
            return Err(Error::InvalidParameter {
                name: "tol",
                message: "must be a non-negative number",
            });
        }
        Ok(())
    }

    fn run_trials<R: Rng + ?Sized>(&self, data: &Array2<f64>, rng: &mut R) -> Result<Vec<KmeansFit>> {
        self.validate(data.nrows())?;

        let seeds: Vec<u64> = (0..self.trials).map(|_| rng.random()).collect();

        #[cfg(feature = "parallel")]
        let fits: Vec<KmeansFit> = seeds
            .par_iter()
            .map(|&s| self.run_once(data, &mut StdRng::seed_from_u64(s)))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let fits: Vec<KmeansFit> = seeds
            .iter()
            .map(|&s| self.run_once(data, &mut StdRng::seed_from_u64(s)))
            .collect();

        Ok(fits)
    }

    /// One Lloyd run. `data` has been validated: `1 <= k <= n`.
    fn run_once<R: Rng + ?Sized>(&self, data: &Array2<f64>, rng: &mut R) -> KmeansFit {
        let (n, d) = data.dim();
        let k = self.k;

        let mut means = Array2::<f64>::zeros((k, d));
        let mut sums = Array2::<f64>::zeros((k, d));
        let mut sizes = vec![0usize; k];

        // Partial Fisher-Yates over sample indices: k distinct seeds.
        let mut order: Vec<usize> = (0..n).collect();
        for i in 0..k {
            let j = rng.random_range(i..n);
            order.swap(i, j);
            means.row_mut(i).assign(&data.row(order[i]));
        }

        let mut labels: Vec<Option<usize>> = vec![None; n];
        let mut iterations = 0;

        while iterations < self.max_iter {
            iterations += 1;

            let assigned = assign(data, &means);

            let mut changed = 0usize;
            for (i, (&new, current)) in assigned.iter().zip(labels.iter_mut()).enumerate() {
                if *current == Some(new) {
                    continue;
                }
                if let Some(old) = *current {
                    sizes[old] -= 1;
                    sub_assign(sums.row_mut(old), data.row(i));
                }
                sizes[new] += 1;
                add_assign(sums.row_mut(new), data.row(i));
                *current = Some(new);
                changed += 1;
            }

            let mut max_shift = 0.0f64;
            for c in 0..k {
                if sizes[c] == 0 {
                    let idx = rng.random_range(0..n);
                    debug!(cluster = c, sample = idx, "reseeding empty cluster");
                    means.row_mut(c).assign(&data.row(idx));
                    continue;
                }
                let mean = &sums.row(c) / sizes[c] as f64;
                max_shift = max_shift.max(squared_distance(means.row(c), mean.view()));
                means.row_mut(c).assign(&mean);
            }

            debug!(iteration = iterations, changed, max_shift, "k-means iteration");

            if changed == 0 || max_shift < self.tol {
                break;
            }
        }

        // Every sample is assigned on the first pass.
        let labels: Vec<usize> = labels.into_iter().map(|l| l.unwrap_or(0)).collect();

        let total: f64 = data
            .axis_iter(Axis(0))
            .zip(labels.iter())
            .map(|(row, &label)| squared_distance(row, means.row(label)))
            .sum();

        KmeansFit {
            labels,
            centroids: means,
            sizes,
            compactness: total / n as f64,
            iterations,
        }
    }
}

/// Nearest centroid for every row of `data`.
fn assign(data: &Array2<f64>, means: &Array2<f64>) -> Vec<usize> {
    let label = |i: usize| nearest(data.row(i), means.rows()).map_or(0, |(c, _)| c);

    #[cfg(feature = "parallel")]
    {
        (0..data.nrows()).into_par_iter().map(label).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        (0..data.nrows()).map(label).collect()
    }
}

impl Clustering for Kmeans {
    fn fit_predict(&self, data: &[Vec<f64>]) -> Result<Vec<usize>> {
        Ok(self.fit(data)?.labels)
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}
