//! Soft assignment ("codeword uncertainty").
//!
//! Each region spreads one unit of weight over every codeword in proportion
//! to a Gaussian kernel of its distance (van Gemert et al., 2008):
//!
//! ```text
//! K_σ(x) = 1/(σ√(2π)) · exp(-x² / 2σ²)
//!
//! h[w] += K_σ(‖r - w‖) / Σ_v K_σ(‖r - v‖)
//! ```
//!
//! The normalizing coefficient cancels in the ratio, and so does any common
//! factor `exp(-m / 2σ²)`. Weights are computed with `m` set to the smallest
//! squared distance, so the nearest codeword always has weight 1 before
//! normalization and distant regions never underflow to 0/0. When the
//! distances themselves are not finite the region is credited to its nearest
//! codeword, the same bin [`HardAssignment`](super::HardAssignment) picks.
//!
//! ## References
//!
//! van Gemert, Geusebroek, Veenman, Smeulders (2008). "Kernel Codebooks for
//! Scene Categorization." ECCV.

use super::Quantizer;
use crate::codebook::Codebook;
use crate::error::{Error, Result};
use crate::histogram::{accumulate, Histogram};
use crate::vector::{check_dim, nearest, squared_distance};
use ndarray::ArrayView1;
use std::f64::consts::PI;

/// Gaussian kernel of bandwidth `sigma` evaluated at distance `x`.
pub fn gaussian_kernel(sigma: f64, x: f64) -> f64 {
    (1.0 / (sigma * (2.0 * PI).sqrt())) * (-(x * x) / (2.0 * sigma * sigma)).exp()
}

/// Kernel-smoothed quantization against a codebook.
#[derive(Debug, Clone)]
pub struct SoftAssignment {
    codebook: Codebook,
    sigma: f64,
}

impl SoftAssignment {
    /// Smoothing bandwidth suited to SIFT-like descriptors.
    pub const DEFAULT_SIGMA: f64 = 100.0;

    /// Quantize against `codebook` with bandwidth `sigma`.
    pub fn new(codebook: Codebook, sigma: f64) -> Result<Self> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(Error::InvalidParameter {
                name: "sigma",
                message: "must be a positive finite number",
            });
        }
        Ok(Self { codebook, sigma })
    }

    /// Quantize with [`SoftAssignment::DEFAULT_SIGMA`].
    pub fn with_default_sigma(codebook: Codebook) -> Self {
        Self {
            codebook,
            sigma: Self::DEFAULT_SIGMA,
        }
    }

    /// The vocabulary.
    pub fn codebook(&self) -> &Codebook {
        &self.codebook
    }

    /// Kernel bandwidth.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Normalized weight of every codeword for one region. Sums to 1.
    pub fn region_weights(&self, region: &[f64]) -> Result<Vec<f64>> {
        check_dim(self.codebook.dim(), region.len())?;
        let mut weights = vec![0.0; self.codebook.len()];
        self.credit(&mut weights, ArrayView1::from(region));
        Ok(weights)
    }

    /// Add one region's normalized weights into `histogram`.
    fn credit(&self, histogram: &mut [f64], region: ArrayView1<'_, f64>) {
        let sq: Vec<f64> = self
            .codebook
            .codewords()
            .into_iter()
            .map(|w| squared_distance(region, w))
            .collect();
        let min = sq.iter().copied().fold(f64::INFINITY, f64::min);
        let two_var = 2.0 * self.sigma * self.sigma;

        let weights: Vec<f64> = sq.iter().map(|&d| (-(d - min) / two_var).exp()).collect();
        let norm: f64 = weights.iter().sum();
        if !(norm > 0.0 && norm.is_finite()) {
            // Distances overflowed or are NaN: the kernel is undefined, so the
            // region goes wholly to its nearest codeword, as hard assignment does.
            if let Some((bin, _)) = nearest(region, self.codebook.codewords()) {
                histogram[bin] += 1.0;
            }
            return;
        }
        for (bin, w) in histogram.iter_mut().zip(weights) {
            *bin += w / norm;
        }
    }
}

impl Quantizer for SoftAssignment {
    fn quantize(&self, regions: &[Vec<f64>]) -> Result<Histogram> {
        for region in regions {
            check_dim(self.codebook.dim(), region.len())?;
        }
        Ok(accumulate(self.size(), regions, |h, region| {
            self.credit(h, ArrayView1::from(region))
        }))
    }

    fn size(&self) -> usize {
        self.codebook.len()
    }
}
