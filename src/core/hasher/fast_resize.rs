//! SIMD-accelerated grayscale resizing.
//!
//! Uses fast_image_resize, which picks AVX2/NEON kernels when available.
//! Shared by the difference hash and by SSIM size alignment.

use crate::error::HashError;
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};

/// Reusable resizer; keeps its scratch buffers between calls
pub struct FastResizer {
    resizer: Resizer,
}

impl FastResizer {
    pub fn new() -> Self {
        Self {
            resizer: Resizer::new(),
        }
    }

    /// Convert to grayscale, then resize to exactly `width` x `height`
    pub fn resize_to_grayscale(
        &mut self,
        image: &DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<GrayImage, HashError> {
        self.resize_gray(&image.to_luma8(), width, height)
    }

    /// Resize an already-grayscale raster to exactly `width` x `height`
    pub fn resize_gray(
        &mut self,
        gray: &GrayImage,
        width: u32,
        height: u32,
    ) -> Result<GrayImage, HashError> {
        let (src_width, src_height) = gray.dimensions();
        if src_width == 0 || src_height == 0 {
            return Err(HashError::EmptyImage {
                width: src_width,
                height: src_height,
            });
        }
        if width == 0 || height == 0 {
            return Err(HashError::ComputationFailed(format!(
                "invalid target size {}x{}",
                width, height
            )));
        }
        if (src_width, src_height) == (width, height) {
            return Ok(gray.clone());
        }

        let src_image = Image::from_vec_u8(src_width, src_height, gray.as_raw().clone(), PixelType::U8)
            .map_err(|e| HashError::ComputationFailed(format!("source buffer: {}", e)))?;
        let mut dst_image = Image::new(width, height, PixelType::U8);

        // Bilinear is plenty for fingerprints and matches area-preserving behaviour
        let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));

        self.resizer
            .resize(&src_image, &mut dst_image, &options)
            .map_err(|e| HashError::ComputationFailed(format!("resize failed: {}", e)))?;

        let buffer: ImageBuffer<Luma<u8>, Vec<u8>> =
            ImageBuffer::from_raw(width, height, dst_image.into_vec()).ok_or_else(|| {
                HashError::ComputationFailed("resized buffer has the wrong size".to_string())
            })?;

        Ok(buffer)
    }
}

impl Default for FastResizer {
    fn default() -> Self {
        Self::new()
    }
}

/// One-off grayscale resize
pub fn resize_to_grayscale(
    image: &DynamicImage,
    width: u32,
    height: u32,
) -> Result<GrayImage, HashError> {
    FastResizer::new().resize_to_grayscale(image, width, height)
}

/// One-off resize of a grayscale raster
pub fn resize_gray(gray: &GrayImage, width: u32, height: u32) -> Result<GrayImage, HashError> {
    FastResizer::new().resize_gray(gray, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn create_test_image(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            let r = (x * 255 / width.max(1)) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            Rgb([r, g, 40])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn resize_produces_requested_dimensions() {
        let resized = resize_to_grayscale(&create_test_image(100, 80), 17, 16).unwrap();
        assert_eq!(resized.dimensions(), (17, 16));
    }

    #[test]
    fn same_size_is_a_copy() {
        let gray = create_test_image(12, 9).to_luma8();
        let resized = resize_gray(&gray, 12, 9).unwrap();
        assert_eq!(resized, gray);
    }

    #[test]
    fn empty_source_is_rejected() {
        let empty = DynamicImage::new_luma8(0, 0);
        let error = resize_to_grayscale(&empty, 9, 8).unwrap_err();
        assert!(matches!(error, HashError::EmptyImage { .. }));
    }

    #[test]
    fn zero_target_is_rejected() {
        assert!(resize_to_grayscale(&create_test_image(10, 10), 0, 8).is_err());
    }

    #[test]
    fn resizer_can_be_reused() {
        let mut resizer = FastResizer::new();
        let image = create_test_image(64, 64);
        let first = resizer.resize_to_grayscale(&image, 9, 8).unwrap();
        let second = resizer.resize_to_grayscale(&image, 9, 8).unwrap();
        assert_eq!(first, second);
    }
}
