//! Difference Hash (dHash) implementation.
//!
//! 1. Convert to grayscale
//! 2. Resize to (hash_size+1) x hash_size
//! 3. Bit (x, y) is 1 when the pixel at x+1 is brighter than the pixel at x
//! 4. Flatten row-major into hash_size² bits

use super::super::fast_resize::resize_to_grayscale;
use super::super::traits::{HashAlgorithm, HashAlgorithmKind, ImageHashValue};
use crate::error::HashError;
use image::DynamicImage;

/// Difference Hash (dHash) implementation
pub struct DifferenceHasher {
    hash_size: u32,
}

impl DifferenceHasher {
    pub fn new(hash_size: u32) -> Self {
        Self { hash_size }
    }
}

impl HashAlgorithm for DifferenceHasher {
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

        // One extra column so every cell has a right-hand neighbour
        let gray = resize_to_grayscale(image, self.hash_size + 1, self.hash_size)?;
        let size = self.hash_size;

        let bits = (0..size).flat_map(|y| {
            let gray = &gray;
            (0..size).map(move |x| gray.get_pixel(x + 1, y)[0] > gray.get_pixel(x, y)[0])
        });

        Ok(ImageHashValue::from_bits(bits, HashAlgorithmKind::Difference))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Difference
    }
}
