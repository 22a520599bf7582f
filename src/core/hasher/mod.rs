//! # Hasher Module
//!
//! Computes compact fingerprints for every loaded image.
//!
//! ## Supported Algorithms
//! - **dHash (Difference Hash)** - sign of the horizontal brightness gradient
//! - **pHash (Perceptual Hash)** - low-frequency DCT coefficients vs their mean
//!
//! Both produce `hash_size²` bits and are compared with normalized Hamming
//! distance. Each image is hashed exactly once per run; the distance matrix
//! reads the cached [`ImageHashes`].
//!
//! ## Example
//! ```rust,ignore
//! use frame_sieve::core::hasher::{HasherConfig, HashAlgorithmKind};
//!
//! let hasher = HasherConfig::new()
//!     .algorithm(HashAlgorithmKind::Difference)
//!     .hash_size(16)
//!     .build()?;
//!
//! let hash = hasher.hash_image(&image)?;
//! ```

mod algorithms;
pub mod fast_resize;
mod traits;

pub use algorithms::{DifferenceHasher, PerceptualHasher};
pub use traits::{HashAlgorithm, HashAlgorithmKind, ImageHashValue, PerceptualHash};

use crate::core::loader::LoadedImage;
use crate::error::HashError;
use image::DynamicImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration builder for hashers
#[derive(Debug, Clone)]
pub struct HasherConfig {
    hash_size: u32,
    algorithm: HashAlgorithmKind,
}

impl HasherConfig {
    /// dHash, 16x16 bits
    pub fn new() -> Self {
        Self {
            hash_size: 16,
            algorithm: HashAlgorithmKind::Difference,
        }
    }

    /// Side of the hash grid; the hash has `size²` bits
    pub fn hash_size(mut self, size: u32) -> Self {
        self.hash_size = size;
        self
    }

    pub fn algorithm(mut self, algorithm: HashAlgorithmKind) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Build the hasher
    pub fn build(self) -> Result<Box<dyn HashAlgorithm>, HashError> {
        if self.hash_size == 0 {
            return Err(HashError::InvalidSize { size: 0 });
        }
        match self.algorithm {
            HashAlgorithmKind::Difference => Ok(Box::new(DifferenceHasher::new(self.hash_size))),
            HashAlgorithmKind::Perceptual => Ok(Box::new(PerceptualHasher::new(self.hash_size))),
        }
    }
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Both fingerprints of one image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHashes {
    pub perceptual: ImageHashValue,
    pub difference: ImageHashValue,
}

/// Computes pHash and dHash with one shared configuration
pub struct DualHasher {
    perceptual: Box<dyn HashAlgorithm>,
    difference: Box<dyn HashAlgorithm>,
}

impl DualHasher {
    pub fn new(hash_size: u32) -> Result<Self, HashError> {
        let config = HasherConfig::new().hash_size(hash_size);
        Ok(Self {
            perceptual: config.clone().algorithm(HashAlgorithmKind::Perceptual).build()?,
            difference: config.algorithm(HashAlgorithmKind::Difference).build()?,
        })
    }

    pub fn hash_image(&self, image: &DynamicImage) -> Result<ImageHashes, HashError> {
        Ok(ImageHashes {
            perceptual: self.perceptual.hash_image(image)?,
            difference: self.difference.hash_image(image)?,
        })
    }
}

/// Hash every image once, in parallel, preserving input order
pub fn compute_hashes(images: &[LoadedImage], hash_size: u32) -> Result<Vec<ImageHashes>, HashError> {
    let hasher = DualHasher::new(hash_size)?;
    images
        .par_iter()
        .map(|image| -> Result<ImageHashes, HashError> {
            let hashes = hasher.hash_image(&image.pixels)?;
            debug!(
                name = %image.name,
                phash = %hashes.perceptual.to_hex(),
                dhash = %hashes.difference.to_hex(),
                "hashed image"
            );
            Ok(hashes)
        })
        .collect()
}
