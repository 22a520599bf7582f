//! # Metrics Module
//!
//! Pairwise measures between two images.
//!
//! | Measure | Range | Identical images |
//! |---------|-------|------------------|
//! | [`hamming`] | 0.0 - 1.0 | 0.0 |
//! | [`structural_similarity`] | -1.0 - 1.0 | 1.0 |
//! | [`combine`] | >= 0.0 | 0.0 |
//!
//! The combined distance is `w_p * phash + w_d * dhash + w_s * (1 - ssim)`.
//! Weights are not normalized.

mod ssim;

pub use ssim::{structural_similarity, structural_similarity_gray, SSIM_WINDOW};

use crate::core::hasher::{ImageHashValue, PerceptualHash};
use crate::error::MetricError;
use serde::{Deserialize, Serialize};

/// Weights of the three signals in the combined distance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricWeights {
    pub phash: f64,
    pub dhash: f64,
    pub ssim: f64,
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self {
            phash: 0.4,
            dhash: 0.3,
            ssim: 0.3,
        }
    }
}

impl MetricWeights {
    /// Whether SSIM contributes at all; when it does not, full-image
    /// comparisons are skipped
    pub fn uses_ssim(&self) -> bool {
        self.ssim > 0.0
    }
}

/// Fraction of bits that differ between two hashes of the same kind and length
pub fn hamming(left: &ImageHashValue, right: &ImageHashValue) -> Result<f64, MetricError> {
    if left.algorithm() != right.algorithm() {
        return Err(MetricError::HashKindMismatch {
            left: left.algorithm().to_string(),
            right: right.algorithm().to_string(),
        });
    }
    if left.bit_count() != right.bit_count() || left.as_bytes().len() != right.as_bytes().len() {
        return Err(MetricError::HashLengthMismatch {
            left: left.bit_count(),
            right: right.bit_count(),
        });
    }
    if left.bit_count() == 0 {
        return Ok(0.0);
    }

    Ok(left.distance(right) as f64 / left.bit_count() as f64)
}

/// Weighted combination of the three signals
pub fn combine(phash_distance: f64, dhash_distance: f64, ssim: f64, weights: &MetricWeights) -> f64 {
    // 1 - ssim can dip below zero by rounding only
    let dissimilarity = (1.0 - ssim).max(0.0);
    weights.phash * phash_distance + weights.dhash * dhash_distance + weights.ssim * dissimilarity
}
