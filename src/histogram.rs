//! Bag-of-words histograms.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Index is codeword id. Value is how much of that codeword the regions hold.
pub type Histogram = Vec<f64>;

/// Sum of all bins.
pub fn total(histogram: &[f64]) -> f64 {
    histogram.iter().sum()
}

/// Scale bins to sum to 1. All-zero histograms are left alone.
pub fn l1_normalize(histogram: &mut [f64]) {
    let sum = total(histogram);
    if sum > 0.0 {
        let inv_sum = 1.0 / sum;
        for w in histogram.iter_mut() {
            *w *= inv_sum;
        }
    }
}

/// Build a `len`-bin histogram by letting `credit` add each region into it.
///
/// With the `parallel` feature regions are split across workers, each
/// filling its own histogram, and the partial histograms are summed.
pub(crate) fn accumulate<F>(len: usize, regions: &[Vec<f64>], credit: F) -> Histogram
where
    F: Fn(&mut [f64], &[f64]) + Sync,
{
    #[cfg(feature = "parallel")]
    {
        regions
            .par_iter()
            .fold(
                || vec![0.0; len],
                |mut h, region| {
                    credit(&mut h, region);
                    h
                },
            )
            .reduce(|| vec![0.0; len], merge)
    }

    #[cfg(not(feature = "parallel"))]
    {
        let mut h = vec![0.0; len];
        for region in regions {
            credit(&mut h, region);
        }
        h
    }
}

#[cfg(feature = "parallel")]
fn merge(mut a: Histogram, b: Histogram) -> Histogram {
    for (x, y) in a.iter_mut().zip(b) {
        *x += y;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l1_normalize() {
        let mut h = vec![1.0, 3.0, 0.0];
        l1_normalize(&mut h);
        assert_eq!(h, vec![0.25, 0.75, 0.0]);

        let mut zeros = vec![0.0; 3];
        l1_normalize(&mut zeros);
        assert_eq!(zeros, vec![0.0; 3]);
    }

    #[test]
    fn test_accumulate_counts_every_region() {
        let regions: Vec<Vec<f64>> = (0..100).map(|i| vec![(i % 4) as f64]).collect();
        let h = accumulate(4, &regions, |h, r| h[r[0] as usize] += 1.0);
        assert_eq!(h, vec![25.0; 4]);
        assert_eq!(total(&h), 100.0);
    }

    #[test]
    fn test_accumulate_no_regions() {
        let h = accumulate(3, &[], |h, _| h[0] += 1.0);
        assert_eq!(h, vec![0.0; 3]);
    }
}
