//! Windowed structural similarity on grayscale rasters.
//!
//! Local statistics come from a 7x7 uniform window using sample
//! (co)variances, and the score is the mean over every window that fits
//! entirely inside the image. Window sums are read from summed-area tables,
//! so a comparison is linear in the pixel count.

use crate::error::MetricError;
use image::{DynamicImage, GrayImage};

/// Side length of the sliding window
pub const SSIM_WINDOW: u32 = 7;

const DYNAMIC_RANGE: f64 = 255.0;
const K1: f64 = 0.01;
const K2: f64 = 0.03;

/// Summed-area table with a zero row and column in front
#[derive(Debug, Clone)]
struct IntegralImage {
    stride: usize,
    values: Vec<f64>,
}

impl IntegralImage {
    fn build(width: usize, height: usize, pixel: impl Fn(usize) -> f64) -> Self {
        let stride = width + 1;
        let mut values = vec![0.0; stride * (height + 1)];
        for y in 0..height {
            let mut row_sum = 0.0;
            for x in 0..width {
                row_sum += pixel(y * width + x);
                let idx = (y + 1) * stride + x + 1;
                values[idx] = values[idx - stride] + row_sum;
            }
        }
        Self { stride, values }
    }

    /// Sum over the `SSIM_WINDOW` square whose top-left corner is `(x, y)`
    fn window_sum(&self, x: usize, y: usize) -> f64 {
        let w = SSIM_WINDOW as usize;
        let s = self.stride;
        self.values[(y + w) * s + x + w] - self.values[y * s + x + w] - self.values[(y + w) * s + x]
            + self.values[y * s + x]
    }
}

/// Mean SSIM between two grayscale rasters of the same size
pub fn structural_similarity_gray(left: &GrayImage, right: &GrayImage) -> Result<f64, MetricError> {
    let (width, height) = left.dimensions();
    if right.dimensions() != (width, height) {
        return Err(MetricError::DimensionMismatch {
            left: (width, height),
            right: right.dimensions(),
        });
    }
    if width < SSIM_WINDOW || height < SSIM_WINDOW {
        return Err(MetricError::ImageTooSmall {
            width,
            height,
            window: SSIM_WINDOW,
        });
    }

    let (w, h) = (width as usize, height as usize);
    let a = left.as_raw();
    let b = right.as_raw();
    let sum_a = IntegralImage::build(w, h, |i| a[i] as f64);
    let sum_b = IntegralImage::build(w, h, |i| b[i] as f64);
    let sum_aa = IntegralImage::build(w, h, |i| a[i] as f64 * a[i] as f64);
    let sum_bb = IntegralImage::build(w, h, |i| b[i] as f64 * b[i] as f64);
    let sum_ab = IntegralImage::build(w, h, |i| a[i] as f64 * b[i] as f64);

    let np = (SSIM_WINDOW * SSIM_WINDOW) as f64;
    let cov_norm = np / (np - 1.0);
    let c1 = (K1 * DYNAMIC_RANGE).powi(2);
    let c2 = (K2 * DYNAMIC_RANGE).powi(2);

    let win = SSIM_WINDOW as usize;
    let mut total = 0.0;
    let mut windows = 0usize;
    for y in 0..=(h - win) {
        for x in 0..=(w - win) {
            let ux = sum_a.window_sum(x, y) / np;
            let uy = sum_b.window_sum(x, y) / np;
            let uxx = sum_aa.window_sum(x, y) / np;
            let uyy = sum_bb.window_sum(x, y) / np;
            let uxy = sum_ab.window_sum(x, y) / np;

            let vx = cov_norm * (uxx - ux * ux);
            let vy = cov_norm * (uyy - uy * uy);
            let vxy = cov_norm * (uxy - ux * uy);

            let numerator = (2.0 * ux * uy + c1) * (2.0 * vxy + c2);
            let denominator = (ux * ux + uy * uy + c1) * (vx + vy + c2);
            total += numerator / denominator;
            windows += 1;
        }
    }

    let score = total / windows as f64;
    if !score.is_finite() {
        return Err(MetricError::NonFinite {
            left: format!("{}x{} raster", width, height),
            right: format!("{}x{} raster", width, height),
        });
    }
    Ok(score)
}

/// Mean SSIM between two images of the same size, compared in grayscale
pub fn structural_similarity(left: &DynamicImage, right: &DynamicImage) -> Result<f64, MetricError> {
    structural_similarity_gray(&left.to_luma8(), &right.to_luma8())
}
