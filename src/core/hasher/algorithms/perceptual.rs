//! Perceptual Hash (pHash) implementation.
//!
//! pHash keeps the low-frequency DCT coefficients of a downscaled grayscale
//! image and thresholds them against their mean. It reacts to overall
//! structure rather than local gradients, so it complements dHash instead of
//! repeating it.
//!
//! The DCT and thresholding come from the image_hasher crate.

use super::super::traits::{HashAlgorithm, HashAlgorithmKind, ImageHashValue};
use crate::error::HashError;
use image::DynamicImage;
use image_hasher::{HashAlg, HasherConfig as ImageHasherConfig};

/// Perceptual Hash (pHash) implementation using DCT
pub struct PerceptualHasher {
    hash_size: u32,
    hasher: image_hasher::Hasher,
}

impl PerceptualHasher {
    pub fn new(hash_size: u32) -> Self {
        let hasher = ImageHasherConfig::new()
            .hash_size(hash_size.max(1), hash_size.max(1))
            .hash_alg(HashAlg::Mean)
            .preproc_dct()
            .to_hasher();

        Self { hash_size, hasher }
    }
}

impl HashAlgorithm for PerceptualHasher {
    fn hash_image(&self, image: &DynamicImage) -> Result<ImageHashValue, HashError> {
        if self.hash_size == 0 {
            return Err(HashError::InvalidSize { size: 0 });
        }
        if image.width() == 0 || image.height() == 0 {
            return Err(HashError::EmptyImage {
                width: image.width(),
                height: image.height(),
            });
        }

        let hash = self.hasher.hash_image(image);
        let bits = self.hash_size * self.hash_size;
        let expected_bytes = bits.div_ceil(8) as usize;
        let bytes = hash.as_bytes().to_vec();
        if bytes.len() != expected_bytes {
            return Err(HashError::ComputationFailed(format!(
                "pHash produced {} bytes, expected {}",
                bytes.len(),
                expected_bytes
            )));
        }

        Ok(ImageHashValue::new(bytes, bits, HashAlgorithmKind::Perceptual))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Perceptual
    }
}
