//! Vocabulary tree quantization.

use super::Quantizer;
use crate::error::Result;
use crate::hierarchy::VocabularyTree;
use crate::histogram::{accumulate, Histogram};
use crate::vector::check_dim;
use ndarray::ArrayView1;

/// Hard assignment to the leaf reached by greedy descent.
///
/// Costs O(K·L) distances per region instead of O(K^L) for a flat lookup over
/// the same leaves, at the price of sometimes missing the nearest leaf.
#[derive(Debug, Clone)]
pub struct VocabularyTreeQuantization {
    tree: VocabularyTree,
}

impl VocabularyTreeQuantization {
    /// Quantize against `tree`.
    pub fn new(tree: VocabularyTree) -> Self {
        Self { tree }
    }

    /// The vocabulary.
    pub fn tree(&self) -> &VocabularyTree {
        &self.tree
    }

    /// Leaf id of a single region.
    pub fn leaf_index(&self, region: &[f64]) -> Result<usize> {
        self.tree.leaf_index(ArrayView1::from(region))
    }
}

impl Quantizer for VocabularyTreeQuantization {
    fn quantize(&self, regions: &[Vec<f64>]) -> Result<Histogram> {
        for region in regions {
            check_dim(self.tree.dim(), region.len())?;
        }
        Ok(accumulate(self.size(), regions, |h, region| {
            h[self.tree.locate(ArrayView1::from(region))] += 1.0;
        }))
    }

    fn size(&self) -> usize {
        self.tree.leaf_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::hierarchy::{hierarchical_kmeans, TreeConfig};
    use ndarray::array;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn corpus() -> Vec<Vec<f64>> {
        (0..64)
            .map(|i| vec![(i % 8) as f64 * 3.0, (i / 8) as f64 * 3.0])
            .collect()
    }

    fn built(seed: u64) -> VocabularyTreeQuantization {
        let tree = hierarchical_kmeans(&corpus(), &TreeConfig::new(2, 2), &mut StdRng::seed_from_u64(seed)).unwrap();
        VocabularyTreeQuantization::new(tree)
    }

    #[test]
    fn test_single_region_sets_one_bin() {
        let quant = built(4);
        assert_eq!(quant.size(), 4);
        assert_eq!(quant.tree().flatten().unwrap().len(), 4);

        for region in [vec![0.0, 0.0], vec![21.0, 21.0], vec![10.0, 3.0]] {
            let h = quant.quantize(&[region]).unwrap();
            assert_eq!(h.len(), 4);
            assert_eq!(h.iter().filter(|&&b| b == 1.0).count(), 1);
            assert_eq!(h.iter().filter(|&&b| b == 0.0).count(), 3);
        }
    }

    #[test]
    fn test_greedy_descent_can_miss_nearest_leaf() {
        // Top level splits at 5; the query at 4.9 goes left even though the
        // right subtree holds a leaf at 5.0.
        let mut tree = VocabularyTree::new(2, 2, 1).unwrap();
        let left = tree.add_child(0, array![0.0]).unwrap();
        let right = tree.add_child(0, array![10.0]).unwrap();
        tree.add_child(left, array![-1.0]).unwrap();
        tree.add_child(left, array![1.0]).unwrap();
        tree.add_child(right, array![5.0]).unwrap();
        tree.add_child(right, array![15.0]).unwrap();

        let quant = VocabularyTreeQuantization::new(tree);
        assert_eq!(quant.leaf_index(&[4.9]).unwrap(), 1);
        assert_eq!(quant.quantize(&[vec![4.9]]).unwrap(), vec![0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_bins_match_single_region_lookup() {
        let quant = built(6);
        let regions: Vec<Vec<f64>> = (0..40)
            .map(|i| vec![(i % 9) as f64 * 2.5, (i % 7) as f64 * 3.5])
            .collect();

        let mut expected = vec![0.0; quant.size()];
        for region in &regions {
            expected[quant.leaf_index(region).unwrap()] += 1.0;
        }
        assert_eq!(quant.quantize(&regions).unwrap(), expected);
    }

    #[test]
    fn test_dimension_mismatch() {
        let quant = built(1);
        assert!(quant.quantize(&[vec![1.0]]).is_err());
        assert!(quant.leaf_index(&[1.0, 2.0, 3.0]).is_err());
        // One bad region fails the whole batch instead of being skipped.
        assert!(matches!(
            quant.quantize(&[vec![1.0, 1.0], vec![1.0, 1.0, 1.0]]),
            Err(Error::DimensionMismatch { expected: 2, found: 3 })
        ));
    }

    proptest! {
        #[test]
        fn prop_histogram_counts_regions(
            regions in prop::collection::vec(prop::collection::vec(-5.0f64..30.0, 2), 0..50)
        ) {
            let quant = built(9);
            let h = quant.quantize(&regions).unwrap();
            prop_assert_eq!(h.len(), 4);
            prop_assert_eq!(h.iter().sum::<f64>(), regions.len() as f64);
        }
    }
}
