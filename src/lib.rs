//! # codeword
//!
//! Visual vocabularies: k-means codebooks, vocabulary trees, and bag-of-words
//! quantization of local feature descriptors.
//!
//! A *vocabulary* is a set of representative vectors (codewords) learned from
//! a training corpus. Encoding an image's regions against it yields a
//! histogram with one bin per codeword.
//!
//! - [`cluster::Kmeans`]: Lloyd k-means with random restarts
//! - [`hierarchy::hierarchical_kmeans`]: recursive k-means into a [`VocabularyTree`]
//! - [`Codebook`]: flat vocabulary with a plain-text format
//! - [`quantize`]: hard, soft (kernel codebook) and tree quantization
//!
//! ```rust
//! use codeword::quantize::{HardAssignment, Quantizer};
//! use codeword::{Codebook, Kmeans};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let corpus = vec![
//!     vec![0.0, 0.0], vec![0.1, 0.0],
//!     vec![9.0, 9.0], vec![9.1, 9.0],
//! ];
//! let codebook = Codebook::train(&corpus, &Kmeans::new(2), &mut StdRng::seed_from_u64(1)).unwrap();
//! let histogram = HardAssignment::new(codebook).quantize(&corpus).unwrap();
//! assert_eq!(histogram, vec![2.0, 2.0]);
//! ```
//!
//! The `parallel` feature (on by default) spreads assignment steps, k-means
//! trials and histogram accumulation over a rayon pool. Results do not depend
//! on it.

pub mod cluster;
pub mod codebook;
/// Error types used across `codeword`.
pub mod error;
pub mod hierarchy;
pub mod histogram;
pub mod quantize;
mod text;
pub mod vector;

pub use cluster::{Clustering, Kmeans, KmeansFit};
pub use codebook::Codebook;
pub use error::{Error, Result};
pub use hierarchy::{hierarchical_kmeans, TreeConfig, VocabularyTree};
pub use histogram::{l1_normalize, Histogram};
pub use quantize::{
    HardAssignment, Quantization, QuantizationKind, Quantizer, SoftAssignment, Vocabulary,
    VocabularyTreeQuantization,
};
