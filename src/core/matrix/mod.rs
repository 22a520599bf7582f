//! # Matrix Module
//!
//! Builds the symmetric `n x n` matrix of combined distances.
//!
//! Every image is hashed once, then every unordered pair `i < j` is measured
//! exactly once. Rows of the upper triangle are distributed across the rayon
//! pool; each cell is written by the worker that owns its row, then mirrored.
//! The first failing pair aborts the build.

use crate::core::hasher::{compute_hashes, fast_resize, ImageHashes};
use crate::core::loader::LoadedImage;
use crate::core::metrics::{combine, hamming, structural_similarity_gray, MetricWeights};
use crate::error::{ClusterError, HashError, MetricError, Result};
use crate::events::{Event, EventSender, HashEvent, MatrixEvent, MatrixProgress};
use image::GrayImage;
use rayon::prelude::*;
use std::borrow::Cow;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

/// Square, symmetric matrix of pairwise distances, stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    /// All-zero matrix for `size` images
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            values: vec![0.0; size * size],
        }
    }

    /// Build from nested rows, checking shape and finiteness
    pub fn from_rows(rows: Vec<Vec<f64>>) -> std::result::Result<Self, ClusterError> {
        let size = rows.len();
        let mut values = Vec::with_capacity(size * size);
        for (row, entries) in rows.into_iter().enumerate() {
            if entries.len() != size {
                return Err(ClusterError::NotSquare {
                    rows: size,
                    row,
                    len: entries.len(),
                });
            }
            if let Some(col) = entries.iter().position(|d| !d.is_finite()) {
                return Err(ClusterError::NonFiniteDistance { row, col });
            }
            values.extend(entries);
        }
        Ok(Self { size, values })
    }

    /// Number of images (rows)
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.size + col]
    }

    fn set_pair(&mut self, row: usize, col: usize, distance: f64) {
        self.values[row * self.size + col] = distance;
        self.values[col * self.size + row] = distance;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.values[row * self.size..(row + 1) * self.size]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        // chunks_exact panics on zero
        self.values.chunks_exact(self.size.max(1))
    }

    /// Largest entry, 0.0 for an empty matrix
    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// Zero diagonal and `m[i][j] == m[j][i]` within `tolerance`
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        (0..self.size).all(|i| {
            self.get(i, i).abs() <= tolerance
                && ((i + 1)..self.size).all(|j| (self.get(i, j) - self.get(j, i)).abs() <= tolerance)
        })
    }

    /// Re-check the invariants clustering relies on
    pub fn validate(&self) -> std::result::Result<(), ClusterError> {
        if self.values.len() != self.size * self.size {
            return Err(ClusterError::NotSquare {
                rows: self.size,
                row: 0,
                len: self.values.len() / self.size.max(1),
            });
        }
        if let Some(idx) = self.values.iter().position(|d| !d.is_finite()) {
            return Err(ClusterError::NonFiniteDistance {
                row: idx / self.size,
                col: idx % self.size,
            });
        }
        Ok(())
    }
}

/// Hash every image and fill the distance matrix
pub fn build(
    images: &[LoadedImage],
    hash_size: u32,
    weights: &MetricWeights,
    events: &EventSender,
) -> Result<(DistanceMatrix, Vec<ImageHashes>)> {
    let hashes = hash_images(images, hash_size, events)?;
    let matrix = build_from_hashes(images, &hashes, weights, events)?;
    Ok((matrix, hashes))
}

/// Both fingerprints of every image, computed once
pub fn hash_images(
    images: &[LoadedImage],
    hash_size: u32,
    events: &EventSender,
) -> std::result::Result<Vec<ImageHashes>, HashError> {
    events.send(Event::Hash(HashEvent::Started {
        total_images: images.len(),
    }));
    let hashes = compute_hashes(images, hash_size)?;
    events.send(Event::Hash(HashEvent::Completed {
        total_hashed: hashes.len(),
    }));
    debug!(count = hashes.len(), hash_size, "computed fingerprints");
    Ok(hashes)
}

/// Fill the distance matrix from precomputed hashes
pub fn build_from_hashes(
    images: &[LoadedImage],
    hashes: &[ImageHashes],
    weights: &MetricWeights,
    events: &EventSender,
) -> Result<DistanceMatrix> {
    let n = images.len();
    let total_pairs = n * n.saturating_sub(1) / 2;
    events.send(Event::Matrix(MatrixEvent::Started { total_pairs }));

    // Grayscale rasters are prepared once and shared by every pair
    let grays: Option<Vec<GrayImage>> = if weights.uses_ssim() {
        Some(images.par_iter().map(|image| image.pixels.to_luma8()).collect())
    } else {
        debug!("ssim weight is zero, skipping structural comparison");
        None
    };

    let completed = AtomicUsize::new(0);
    let upper: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| -> std::result::Result<Vec<f64>, MetricError> {
            let row = ((i + 1)..n)
                .map(|j| {
                    let grays = grays.as_ref().map(|g| (&g[i], &g[j]));
                    pair_distance(&images[i], &images[j], &hashes[i], &hashes[j], grays, weights)
                })
                .collect::<std::result::Result<Vec<f64>, MetricError>>()?;

            if !row.is_empty() {
                let pairs_completed = completed.fetch_add(row.len(), Ordering::Relaxed) + row.len();
                events.send(Event::Matrix(MatrixEvent::Progress(MatrixProgress {
                    pairs_completed,
                    total_pairs,
                })));
            }
            Ok(row)
        })
        .collect::<std::result::Result<Vec<_>, MetricError>>()?;

    let mut matrix = DistanceMatrix::zeros(n);
    for (i, row) in upper.into_iter().enumerate() {
        for (offset, distance) in row.into_iter().enumerate() {
            matrix.set_pair(i, i + 1 + offset, distance);
        }
    }

    info!(images = n, pairs = total_pairs, max = matrix.max_value(), "distance matrix built");
    events.send(Event::Matrix(MatrixEvent::Completed { total_pairs }));
    Ok(matrix)
}

fn pair_distance(
    left: &LoadedImage,
    right: &LoadedImage,
    left_hashes: &ImageHashes,
    right_hashes: &ImageHashes,
    grays: Option<(&GrayImage, &GrayImage)>,
    weights: &MetricWeights,
) -> std::result::Result<f64, MetricError> {
    let phash = hamming(&left_hashes.perceptual, &right_hashes.perceptual)?;
    let dhash = hamming(&left_hashes.difference, &right_hashes.difference)?;
    let ssim = match grays {
        Some((a, b)) => aligned_ssim(left, right, a, b)?,
        None => 1.0,
    };

    let distance = combine(phash, dhash, ssim, weights);
    if !distance.is_finite() {
        return Err(MetricError::NonFinite {
            left: left.name.clone(),
            right: right.name.clone(),
        });
    }
    Ok(distance)
}

/// SSIM after shrinking both rasters to their common minimum size
fn aligned_ssim(
    left: &LoadedImage,
    right: &LoadedImage,
    a: &GrayImage,
    b: &GrayImage,
) -> std::result::Result<f64, MetricError> {
    let failed = |reason: String| MetricError::PairFailed {
        left: left.name.clone(),
        right: right.name.clone(),
        reason,
    };

    let (width, height) = (a.width().min(b.width()), a.height().min(b.height()));
    let a = align(a, width, height).map_err(|e| failed(e.to_string()))?;
    let b = align(b, width, height).map_err(|e| failed(e.to_string()))?;
    structural_similarity_gray(&a, &b).map_err(|e| failed(e.to_string()))
}

fn align(gray: &GrayImage, width: u32, height: u32) -> std::result::Result<Cow<'_, GrayImage>, HashError> {
    if gray.dimensions() == (width, height) {
        return Ok(Cow::Borrowed(gray));
    }
    fast_resize::resize_gray(gray, width, height).map(Cow::Owned)
}
