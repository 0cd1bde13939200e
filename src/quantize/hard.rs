//! Hard assignment.

use super::Quantizer;
use crate::codebook::Codebook;
use crate::error::Result;
use crate::histogram::{accumulate, Histogram};
use crate::vector::{check_dim, nearest};
use ndarray::ArrayView1;

/// Credits each region entirely to its nearest codeword.
///
/// Bins hold integer counts, so the histogram sums to the number of regions.
#[derive(Debug, Clone)]
pub struct HardAssignment {
    codebook: Codebook,
}

impl HardAssignment {
    /// Quantize against `codebook`.
    pub fn new(codebook: Codebook) -> Self {
        Self { codebook }
    }

    /// The vocabulary.
    pub fn codebook(&self) -> &Codebook {
        &self.codebook
    }

    /// Id of the codeword nearest to `region` (lowest id on ties).
    pub fn nearest_codeword(&self, region: &[f64]) -> Result<usize> {
        self.codebook.nearest(ArrayView1::from(region))
    }
}

impl Quantizer for HardAssignment {
    fn quantize(&self, regions: &[Vec<f64>]) -> Result<Histogram> {
        for region in regions {
            check_dim(self.codebook.dim(), region.len())?;
        }
        Ok(accumulate(self.size(), regions, |h, region| {
            if let Some((bin, _)) = nearest(ArrayView1::from(region), self.codebook.codewords()) {
                h[bin] += 1.0;
            }
        }))
    }

    fn size(&self) -> usize {
        self.codebook.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use proptest::prelude::*;

    fn two_words() -> HardAssignment {
        HardAssignment::new(Codebook::from_rows(&[vec![0.0, 0.0], vec![10.0, 10.0]]).unwrap())
    }

    #[test]
    fn test_single_regions() {
        let quant = two_words();
        assert_eq!(quant.quantize(&[vec![1.0, 1.0]]).unwrap(), vec![1.0, 0.0]);
        assert_eq!(quant.quantize(&[vec![9.0, 9.0]]).unwrap(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_equidistant_region_goes_to_lower_id() {
        let quant = two_words();
        for _ in 0..5 {
            assert_eq!(quant.nearest_codeword(&[5.0, 5.0]).unwrap(), 0);
        }
        assert_eq!(quant.quantize(&[vec![5.0, 5.0]]).unwrap(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_counts_accumulate() {
        let quant = two_words();
        let regions = vec![vec![0.0, 1.0], vec![8.0, 9.0], vec![-3.0, 0.0], vec![12.0, 12.0]];
        assert_eq!(quant.quantize(&regions).unwrap(), vec![2.0, 2.0]);
        assert_eq!(quant.quantize(&[]).unwrap(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let quant = two_words();
        assert!(matches!(
            quant.quantize(&[vec![1.0, 1.0], vec![1.0, 1.0, 1.0]]),
            Err(Error::DimensionMismatch { expected: 2, found: 3 })
        ));
    }

    proptest! {
        #[test]
        fn prop_histogram_counts_regions(
            regions in prop::collection::vec(prop::collection::vec(-20.0f64..20.0, 2), 0..60)
        ) {
            let quant = HardAssignment::new(
                Codebook::from_rows(&[vec![0.0, 0.0], vec![5.0, -5.0], vec![-7.0, 3.0]]).unwrap(),
            );
            let h = quant.quantize(&regions).unwrap();
            prop_assert_eq!(h.len(), 3);
            prop_assert_eq!(h.iter().sum::<f64>(), regions.len() as f64);
            prop_assert!(h.iter().all(|b| b.fract() == 0.0));
        }
    }
}
