//! Trait definitions for image fingerprints.

use crate::error::HashError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// A computed fingerprint that can be compared bit by bit
pub trait PerceptualHash: Clone + Send + Sync {
    /// Number of bits that differ from `other`
    fn distance(&self, other: &Self) -> u32;

    /// Packed hash bytes, most significant bit first
    fn as_bytes(&self) -> &[u8];

    /// Hash as lowercase hex
    fn to_hex(&self) -> String {
        self.as_bytes()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }

    /// Number of meaningful bits (padding excluded)
    fn bit_count(&self) -> u32 {
        (self.as_bytes().len() * 8) as u32
    }
}

/// Available fingerprint algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithmKind {
    /// Difference Hash (dHash) - brightness gradient between neighbours
    Difference,
    /// Perceptual Hash (pHash) - low-frequency DCT coefficients
    Perceptual,
}

impl std::fmt::Display for HashAlgorithmKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashAlgorithmKind::Difference => write!(f, "dHash"),
            HashAlgorithmKind::Perceptual => write!(f, "pHash"),
        }
    }
}

/// Trait for hash algorithm implementations
pub trait HashAlgorithm: Send + Sync {
    /// Compute a fingerprint from a decoded image
    fn hash_image(&self, image: &DynamicImage) -> Result<ImageHashValue, HashError>;

    fn kind(&self) -> HashAlgorithmKind;
}

/// Concrete fingerprint value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHashValue {
    bytes: Vec<u8>,
    bits: u32,
    algorithm: HashAlgorithmKind,
}

impl ImageHashValue {
    /// Wrap already-packed bytes holding `bits` meaningful bits
    pub fn new(bytes: Vec<u8>, bits: u32, algorithm: HashAlgorithmKind) -> Self {
        Self {
            bytes,
            bits,
            algorithm,
        }
    }

    /// Pack a row-major bit sequence, most significant bit first
    pub fn from_bits(bits: impl IntoIterator<Item = bool>, algorithm: HashAlgorithmKind) -> Self {
        let mut bytes = Vec::new();
        let mut current_byte: u8 = 0;
        let mut bit_position = 0;
        let mut count: u32 = 0;

        for bit in bits {
            if bit {
                current_byte |= 1 << (7 - bit_position);
            }
            bit_position += 1;
            count += 1;

            if bit_position == 8 {
                bytes.push(current_byte);
                current_byte = 0;
                bit_position = 0;
            }
        }

        if bit_position > 0 {
            bytes.push(current_byte);
        }

        Self::new(bytes, count, algorithm)
    }

    pub fn algorithm(&self) -> HashAlgorithmKind {
        self.algorithm
    }
}

impl PerceptualHash for ImageHashValue {
    fn distance(&self, other: &Self) -> u32 {
        self.bytes
            .iter()
            .zip(other.bytes.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }

    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn bit_count(&self) -> u32 {
        self.bits
    }
}
