//! Flat clustering of feature vectors into codewords.
//!
//! ## K-means
//!
//! Assign each point to the nearest centroid, then move each centroid to the
//! mean of its points. Repeat.
//!
//! **Objective**: minimize the within-cluster sum of squares:
//!
//! ```text
//! J = Σ_k Σ_{x ∈ C_k} ||x - μ_k||²
//! ```
//!
//! In a bag-of-words pipeline the centroids become the codebook and the
//! labels are discarded. The labels matter when clustering recursively (see
//! [`crate::hierarchy::hierarchical_kmeans`]), where each cluster's members
//! are partitioned again.
//!
//! ## Usage
//!
//! ```rust
//! use codeword::cluster::{Clustering, Kmeans};
//!
//! let data = vec![
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.1],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.1],
//! ];
//!
//! let labels = Kmeans::new(2).with_seed(7).fit_predict(&data).unwrap();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[2]);
//! ```

mod kmeans;
mod traits;

pub use kmeans::{Kmeans, KmeansFit};
pub use traits::Clustering;
