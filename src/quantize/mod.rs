//! Histogram encoding of feature vectors against a vocabulary.
//!
//! | Strategy | Vocabulary | Credit per region | Cost per region |
//! |----------|------------|-------------------|-----------------|
//! | [`HardAssignment`] | codebook | 1 to the nearest codeword | O(N) |
//! | [`SoftAssignment`] | codebook | kernel weights over all codewords, summing to 1 | O(N) |
//! | [`VocabularyTreeQuantization`] | tree | 1 to the leaf reached greedily | O(K·L) |
//!
//! Every strategy returns a fresh histogram whose length is the vocabulary
//! size and whose bins sum to the number of regions (exactly for the hard
//! strategies, up to rounding for the soft one).
//!
//! ```rust
//! use codeword::quantize::{HardAssignment, Quantizer};
//! use codeword::Codebook;
//!
//! let codebook = Codebook::from_rows(&[vec![0.0, 0.0], vec![10.0, 10.0]]).unwrap();
//! let quant = HardAssignment::new(codebook);
//! assert_eq!(quant.quantize(&[vec![1.0, 1.0]]).unwrap(), vec![1.0, 0.0]);
//! ```

mod hard;
mod soft;
mod tree;

pub use hard::HardAssignment;
pub use soft::{gaussian_kernel, SoftAssignment};
pub use tree::VocabularyTreeQuantization;

use crate::codebook::Codebook;
use crate::error::{Error, Result};
use crate::hierarchy::VocabularyTree;
use crate::histogram::Histogram;
use core::fmt;
use core::str::FromStr;

/// Encodes a set of regions as a histogram over a vocabulary.
pub trait Quantizer {
    /// Histogram of `regions`, one bin per codeword.
    fn quantize(&self, regions: &[Vec<f64>]) -> Result<Histogram>;

    /// Number of bins.
    fn size(&self) -> usize;
}

/// Which strategy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantizationKind {
    /// [`HardAssignment`].
    Hard,
    /// [`SoftAssignment`].
    Soft,
    /// [`VocabularyTreeQuantization`].
    Tree,
}

impl fmt::Display for QuantizationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantizationKind::Hard => write!(f, "hard"),
            QuantizationKind::Soft => write!(f, "soft"),
            QuantizationKind::Tree => write!(f, "tree"),
        }
    }
}

impl FromStr for QuantizationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hard" => Ok(QuantizationKind::Hard),
            "soft" => Ok(QuantizationKind::Soft),
            "tree" => Ok(QuantizationKind::Tree),
            _ => Err(Error::InvalidParameter {
                name: "quantization",
                message: "expected one of 'hard', 'soft', 'tree'",
            }),
        }
    }
}

/// A loaded vocabulary.
#[derive(Debug, Clone)]
pub enum Vocabulary {
    /// Flat list of codewords.
    Flat(Codebook),
    /// Vocabulary tree.
    Tree(VocabularyTree),
}

/// Any of the quantization strategies.
#[derive(Debug, Clone)]
pub enum Quantization {
    /// Nearest-codeword counts.
    Hard(HardAssignment),
    /// Kernel-smoothed weights.
    Soft(SoftAssignment),
    /// Greedy tree descent counts.
    Tree(VocabularyTreeQuantization),
}

impl Quantization {
    /// Build the strategy `kind` over `vocabulary`.
    ///
    /// Hard and soft assignment over a tree use its flattened leaves (all
    /// K^L ids, empty ones included). Tree quantization needs a tree.
    pub fn build(kind: QuantizationKind, vocabulary: Vocabulary) -> Result<Self> {
        match (kind, vocabulary) {
            (QuantizationKind::Hard, Vocabulary::Flat(codebook)) => {
                Ok(Quantization::Hard(HardAssignment::new(codebook)))
            }
            (QuantizationKind::Hard, Vocabulary::Tree(tree)) => {
                Ok(Quantization::Hard(HardAssignment::new(tree.flatten()?)))
            }
            (QuantizationKind::Soft, Vocabulary::Flat(codebook)) => {
                Ok(Quantization::Soft(SoftAssignment::with_default_sigma(codebook)))
            }
            (QuantizationKind::Soft, Vocabulary::Tree(tree)) => Ok(Quantization::Soft(
                SoftAssignment::with_default_sigma(tree.flatten()?),
            )),
            (QuantizationKind::Tree, Vocabulary::Tree(tree)) => {
                Ok(Quantization::Tree(VocabularyTreeQuantization::new(tree)))
            }
            (QuantizationKind::Tree, Vocabulary::Flat(_)) => Err(Error::InvalidParameter {
                name: "vocabulary",
                message: "tree quantization needs a vocabulary tree",
            }),
        }
    }

    /// Which strategy this is.
    pub fn kind(&self) -> QuantizationKind {
        match self {
            Quantization::Hard(_) => QuantizationKind::Hard,
            Quantization::Soft(_) => QuantizationKind::Soft,
            Quantization::Tree(_) => QuantizationKind::Tree,
        }
    }
}

impl Quantizer for Quantization {
    fn quantize(&self, regions: &[Vec<f64>]) -> Result<Histogram> {
        match self {
            Quantization::Hard(q) => q.quantize(regions),
            Quantization::Soft(q) => q.quantize(regions),
            Quantization::Tree(q) => q.quantize(regions),
        }
    }

    fn size(&self) -> usize {
        match self {
            Quantization::Hard(q) => q.size(),
            Quantization::Soft(q) => q.size(),
            Quantization::Tree(q) => q.size(),
        }
    }
}

impl From<HardAssignment> for Quantization {
    fn from(q: HardAssignment) -> Self {
        Quantization::Hard(q)
    }
}

impl From<SoftAssignment> for Quantization {
    fn from(q: SoftAssignment) -> Self {
        Quantization::Soft(q)
    }
}

impl From<VocabularyTreeQuantization> for Quantization {
    fn from(q: VocabularyTreeQuantization) -> Self {
        Quantization::Tree(q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn tree() -> VocabularyTree {
        let mut tree = VocabularyTree::new(2, 1, 1).unwrap();
        tree.add_child(0, array![0.0]).unwrap();
        tree.add_child(0, array![10.0]).unwrap();
        tree
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("hard".parse::<QuantizationKind>().unwrap(), QuantizationKind::Hard);
        assert_eq!(" Soft ".parse::<QuantizationKind>().unwrap(), QuantizationKind::Soft);
        assert_eq!("TREE".parse::<QuantizationKind>().unwrap(), QuantizationKind::Tree);
        assert!("fuzzy".parse::<QuantizationKind>().is_err());
        for kind in [QuantizationKind::Hard, QuantizationKind::Soft, QuantizationKind::Tree] {
            assert_eq!(kind.to_string().parse::<QuantizationKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_build_dispatches() {
        let codebook = Codebook::from_rows(&[vec![0.0], vec![10.0]]).unwrap();
        let regions = vec![vec![1.0], vec![9.0], vec![8.0]];

        for kind in [QuantizationKind::Hard, QuantizationKind::Soft] {
            let q = Quantization::build(kind, Vocabulary::Flat(codebook.clone())).unwrap();
            assert_eq!(q.kind(), kind);
            assert_eq!(q.size(), 2);
            let h = q.quantize(&regions).unwrap();
            assert!((h.iter().sum::<f64>() - 3.0).abs() < 1e-9);
        }

        let q = Quantization::build(QuantizationKind::Tree, Vocabulary::Tree(tree())).unwrap();
        assert_eq!(q.quantize(&regions).unwrap(), vec![1.0, 2.0]);

        let q = Quantization::build(QuantizationKind::Hard, Vocabulary::Tree(tree())).unwrap();
        assert_eq!(q.quantize(&regions).unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_tree_kind_needs_tree() {
        let codebook = Codebook::from_rows(&[vec![0.0]]).unwrap();
        assert!(matches!(
            Quantization::build(QuantizationKind::Tree, Vocabulary::Flat(codebook)),
            Err(Error::InvalidParameter { name: "vocabulary", .. })
        ));
    }

    #[test]
    fn test_strategies_as_trait_objects() {
        let codebook = Codebook::from_rows(&[vec![0.0], vec![10.0]]).unwrap();
        let strategies: Vec<Box<dyn Quantizer>> = vec![
            Box::new(HardAssignment::new(codebook.clone())),
            Box::new(SoftAssignment::new(codebook, 2.0).unwrap()),
            Box::new(VocabularyTreeQuantization::new(tree())),
        ];
        for q in &strategies {
            let h = q.quantize(&[vec![0.5]]).unwrap();
            assert_eq!(h.len(), q.size());
            assert!((h.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }
}
