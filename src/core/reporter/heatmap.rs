//! Distance-matrix heatmap.
//!
//! Each matrix cell becomes a square block coloured through a viridis ramp,
//! with values normalized by the largest entry. Dark purple means
//! near-identical, yellow means the most distant pair in the set.

use crate::core::matrix::DistanceMatrix;
use crate::error::OutputError;
use image::{Rgb, RgbImage};
use std::path::Path;

/// File name of the heatmap inside the report directory
pub const HEATMAP_FILE_NAME: &str = "similarity_heatmap.png";

/// Approximate side of the rendered image in pixels
pub const HEATMAP_TARGET_SIDE: u32 = 800;

/// Viridis, sampled at five stops
const VIRIDIS: [(f32, [u8; 3]); 5] = [
    (0.0, [68, 1, 84]),
    (0.25, [59, 82, 139]),
    (0.5, [33, 145, 140]),
    (0.75, [94, 201, 98]),
    (1.0, [253, 231, 37]),
];

/// Map `value` in `[0, 1]` onto the ramp
pub fn colormap(value: f32) -> Rgb<u8> {
    let x = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };
    let mut i = 0;
    while i + 1 < VIRIDIS.len() - 1 && x > VIRIDIS[i + 1].0 {
        i += 1;
    }
    let (x0, c0) = VIRIDIS[i];
    let (x1, c1) = VIRIDIS[i + 1];
    let t = if x1 > x0 { (x - x0) / (x1 - x0) } else { 0.0 };
    let lerp = |a: u8, b: u8| -> u8 { (a as f32 + t * (b as f32 - a as f32)).round() as u8 };
    Rgb([lerp(c0[0], c1[0]), lerp(c0[1], c1[1]), lerp(c0[2], c1[2])])
}

/// Render the matrix.
///
/// Up to 800 images each cell is an `800 / n` pixel block. Larger matrices
/// are sampled onto an 800 x 800 image, one matrix cell per pixel.
pub fn render_heatmap(matrix: &DistanceMatrix) -> RgbImage {
    let n = matrix.len() as u32;
    if n == 0 {
        return RgbImage::new(1, 1);
    }

    let side = if n > HEATMAP_TARGET_SIDE {
        HEATMAP_TARGET_SIDE
    } else {
        n * (HEATMAP_TARGET_SIDE / n)
    };
    let max = matrix.max_value();
    let cell_at = |pixel: u32| (pixel as u64 * n as u64 / side as u64) as usize;

    RgbImage::from_fn(side, side, |x, y| {
        let (row, col) = (cell_at(y), cell_at(x));
        let value = if max > 0.0 { matrix.get(row, col) / max } else { 0.0 };
        colormap(value as f32)
    })
}

/// Render and save as PNG
pub fn write_heatmap(matrix: &DistanceMatrix, path: &Path) -> Result<(), OutputError> {
    render_heatmap(matrix)
        .save(path)
        .map_err(|source| OutputError::Heatmap {
            path: path.to_path_buf(),
            source,
        })
}
