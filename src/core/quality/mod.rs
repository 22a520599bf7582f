//! # Quality Analysis Module
//!
//! Scores image sharpness with the variance of the Laplacian.
//! Sharp frames have well-defined edges and therefore a high variance;
//! motion blur and defocus flatten the response.

use crate::core::loader::LoadedImage;
use image::{DynamicImage, GrayImage};
use rayon::prelude::*;
use tracing::debug;

/// Sharpness of an image, higher is sharper
pub fn sharpness(image: &DynamicImage) -> f64 {
    laplacian_variance(&image.to_luma8())
}

/// Sharpness of every image, in input order
pub fn compute_sharpness(images: &[LoadedImage]) -> Vec<f64> {
    let scores: Vec<f64> = images.par_iter().map(|image| sharpness(&image.pixels)).collect();
    for (image, score) in images.iter().zip(&scores) {
        debug!(name = %image.name, sharpness = score, "scored sharpness");
    }
    scores
}

/// Population variance of the 3x3 Laplacian over every pixel.
///
/// Kernel `[0, 1, 0; 1, -4, 1; 0, 1, 0]`. Pixels outside the image are
/// mirrored without repeating the edge (`dcb|abcd|cba`), so border pixels
/// contribute like any other. An empty image scores 0.
pub fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return 0.0;
    }

    let at = |x: i64, y: i64| -> f64 {
        let x = reflect_101(x, width);
        let y = reflect_101(y, height);
        gray.get_pixel(x, y)[0] as f64
    };

    let mut responses: Vec<f64> = Vec::with_capacity((width as usize) * (height as usize));
    for y in 0..height as i64 {
        for x in 0..width as i64 {
            let center = at(x, y);
            responses.push(at(x, y - 1) + at(x, y + 1) + at(x - 1, y) + at(x + 1, y) - 4.0 * center);
        }
    }

    let n = responses.len() as f64;
    let mean = responses.iter().sum::<f64>() / n;
    responses.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / n
}

/// Mirror an out-of-range coordinate back into `0..len`, one step past the edge
fn reflect_101(index: i64, len: u32) -> u32 {
    let len = len as i64;
    if len == 1 {
        return 0;
    }
    let mirrored = if index < 0 {
        -index
    } else if index >= len {
        2 * len - 2 - index
    } else {
        index
    };
    mirrored as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::imageops::FilterType;
    use image::{ImageBuffer, Luma};
    use std::path::PathBuf;

    fn create_uniform_image(value: u8, size: u32) -> DynamicImage {
        let buffer: ImageBuffer<Luma<u8>, Vec<u8>> =
            ImageBuffer::from_fn(size, size, |_, _| Luma([value]));
        DynamicImage::ImageLuma8(buffer)
    }

    fn create_checkerboard_image(size: u32) -> DynamicImage {
        let buffer: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::from_fn(size, size, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                Luma([0])
            } else {
                Luma([255])
            }
        });
        DynamicImage::ImageLuma8(buffer)
    }

    #[test]
    fn uniform_image_has_zero_sharpness() {
        assert_eq!(sharpness(&create_uniform_image(128, 64)), 0.0);
    }

    #[test]
    fn checkerboard_has_high_sharpness() {
        let score = sharpness(&create_checkerboard_image(64));
        assert!(score > 1000.0, "checkerboard should be sharp, got {}", score);
    }

    #[test]
    fn blurring_lowers_sharpness() {
        let sharp = create_checkerboard_image(64);
        let blurred = sharp.blur(2.0);
        assert!(sharpness(&blurred) < sharpness(&sharp));

        let soft = sharp
            .resize_exact(16, 16, FilterType::Triangle)
            .resize_exact(64, 64, FilterType::Triangle);
        assert!(sharpness(&soft) < sharpness(&sharp));
    }

    #[test]
    fn empty_and_flat_tiny_images_score_zero() {
        assert_eq!(laplacian_variance(&GrayImage::new(0, 0)), 0.0);
        assert_eq!(sharpness(&create_uniform_image(200, 1)), 0.0);
        assert_eq!(sharpness(&create_uniform_image(200, 2)), 0.0);
    }

    #[test]
    fn single_spike_has_known_variance() {
        // Responses: -40 at the spike, +10 on its four neighbours, 0 elsewhere
        let mut gray = GrayImage::new(5, 5);
        gray.put_pixel(2, 2, Luma([10]));
        assert_eq!(laplacian_variance(&gray), 80.0);
    }

    #[test]
    fn border_pixels_are_scored() {
        // Detail confined to the corner still registers
        let mut gray = GrayImage::new(6, 6);
        gray.put_pixel(0, 0, Luma([200]));
        assert!(laplacian_variance(&gray) > 0.0);
    }

    #[test]
    fn border_mirrors_without_repeating_the_edge() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(2, 5), 2);
        assert_eq!(reflect_101(-1, 1), 0);
        assert_eq!(reflect_101(1, 1), 0);
    }

    #[test]
    fn compute_sharpness_preserves_order() {
        let images = vec![
            LoadedImage {
                index: 0,
                name: "flat.png".to_string(),
                path: PathBuf::from("/scans/flat.png"),
                pixels: create_uniform_image(90, 32),
            },
            LoadedImage {
                index: 1,
                name: "edges.png".to_string(),
                path: PathBuf::from("/scans/edges.png"),
                pixels: create_checkerboard_image(32),
            },
        ];
        let scores = compute_sharpness(&images);
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0], 0.0);
        assert!(scores[1] > 0.0);
    }
}
