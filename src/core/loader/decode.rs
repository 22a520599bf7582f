//! Image decoding and downscaling.
//!
//! JPEG frames go through zune-jpeg (1.5-2x faster than the image crate),
//! anything zune-jpeg rejects falls back to the image crate.

use crate::error::InputError;
use image::imageops::FilterType;
use image::{DynamicImage, ImageBuffer, Luma, Rgb, Rgba};
use std::fs;
use std::path::Path;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Formats with a dedicated decode path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Jpeg,
    Png,
    Other,
}

impl SourceFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("jpg" | "jpeg") => Self::Jpeg,
            Some("png") => Self::Png,
            _ => Self::Other,
        }
    }
}

/// Decodes source images
pub struct FastDecoder;

impl FastDecoder {
    /// Decode an image using the fastest decoder for its format
    pub fn decode(path: &Path) -> Result<DynamicImage, InputError> {
        match SourceFormat::from_path(path) {
            SourceFormat::Jpeg => Self::decode_jpeg(path).or_else(|_| Self::decode_fallback(path)),
            _ => Self::decode_fallback(path),
        }
    }

    fn decode_jpeg(path: &Path) -> Result<DynamicImage, InputError> {
        let file_bytes = fs::read(path).map_err(|e| InputError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
        let mut decoder = JpegDecoder::new_with_options(&file_bytes, options);

        let pixels = decoder.decode().map_err(|e| InputError::DecodeError {
            path: path.to_path_buf(),
            reason: format!("zune-jpeg decode failed: {:?}", e),
        })?;

        let info = decoder.info().ok_or_else(|| InputError::DecodeError {
            path: path.to_path_buf(),
            reason: "missing JPEG header info".to_string(),
        })?;
        let (width, height) = (info.width as u32, info.height as u32);

        let buffer_error = |kind: &str| InputError::DecodeError {
            path: path.to_path_buf(),
            reason: format!("decoded {} buffer has the wrong size", kind),
        };

        match decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB) {
            ColorSpace::RGB => {
                let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| buffer_error("RGB"))?;
                Ok(DynamicImage::ImageRgb8(buffer))
            }
            ColorSpace::RGBA => {
                let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| buffer_error("RGBA"))?;
                Ok(DynamicImage::ImageRgba8(buffer))
            }
            ColorSpace::Luma => {
                let buffer: ImageBuffer<Luma<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| buffer_error("Luma"))?;
                Ok(DynamicImage::ImageLuma8(buffer))
            }
            _ => Self::decode_fallback(path),
        }
    }

    fn decode_fallback(path: &Path) -> Result<DynamicImage, InputError> {
        image::open(path).map_err(|e| InputError::DecodeError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Target dimensions so that the longer side is at most `max_side`.
///
/// Returns `None` when the image already fits. Dimensions are truncated,
/// never below one pixel.
pub fn fit_within(width: u32, height: u32, max_side: u32) -> Option<(u32, u32)> {
    let longest = width.max(height);
    if longest <= max_side || longest == 0 {
        return None;
    }

    let scale = max_side as f64 / longest as f64;
    let new_width = ((width as f64 * scale) as u32).max(1);
    let new_height = ((height as f64 * scale) as u32).max(1);
    Some((new_width, new_height))
}

/// Downscale (never upscale) so the longer side fits `max_side`
pub fn downscale(image: DynamicImage, max_side: u32) -> DynamicImage {
    match fit_within(image.width(), image.height(), max_side) {
        Some((width, height)) => image.resize_exact(width, height, FilterType::Triangle),
        None => image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_detection() {
        assert_eq!(SourceFormat::from_path(Path::new("a.JPG")), SourceFormat::Jpeg);
        assert_eq!(SourceFormat::from_path(Path::new("a.jpeg")), SourceFormat::Jpeg);
        assert_eq!(SourceFormat::from_path(Path::new("a.png")), SourceFormat::Png);
        assert_eq!(SourceFormat::from_path(Path::new("a.bmp")), SourceFormat::Other);
    }

    #[test]
    fn fit_within_leaves_small_images_alone() {
        assert_eq!(fit_within(800, 600, 1024), None);
        assert_eq!(fit_within(1024, 300, 1024), None);
    }

    #[test]
    fn fit_within_preserves_aspect_ratio() {
        assert_eq!(fit_within(4000, 3000, 1000), Some((1000, 750)));
        assert_eq!(fit_within(3000, 4000, 1000), Some((750, 1000)));
    }

    #[test]
    fn fit_within_never_returns_zero() {
        assert_eq!(fit_within(10_000, 1, 100), Some((100, 1)));
    }

    #[test]
    fn downscale_shrinks_longer_side() {
        let image = DynamicImage::new_rgb8(300, 150);
        let scaled = downscale(image, 100);
        assert_eq!((scaled.width(), scaled.height()), (100, 50));
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();

        let error = FastDecoder::decode(&path).unwrap_err();
        assert!(matches!(error, InputError::DecodeError { .. }));
    }
}
