//! # Loader Module
//!
//! Turns a source directory into an ordered, in-memory image collection.
//!
//! - Only the top level of the directory is read.
//! - Files are ordered by file name, so ordinals are stable between runs.
//! - Every image is downscaled so its longer side fits `resize_max`.
//! - A single undecodable file fails the whole load.

mod decode;
mod filter;

pub use decode::{downscale, fit_within, FastDecoder, SourceFormat};
pub use filter::ImageFilter;

use crate::error::InputError;
use crate::events::{Event, EventSender, LoadEvent};
use image::DynamicImage;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// One source image, decoded and downscaled
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Position in the sorted input, `0..n`
    pub index: usize,
    /// File name, unique within a run
    pub name: String,
    /// Where the original file lives
    pub path: PathBuf,
    /// Decoded raster after downscaling
    pub pixels: DynamicImage,
}

/// Loads every supported image in a directory
pub struct ImageLoader {
    filter: ImageFilter,
    resize_max: u32,
}

impl ImageLoader {
    pub fn new(resize_max: u32) -> Self {
        Self {
            filter: ImageFilter::new(),
            resize_max,
        }
    }

    /// List supported files in `dir`, sorted by file name
    pub fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>, InputError> {
        if !dir.is_dir() {
            return Err(InputError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|source| InputError::ReadDirectory {
                path: dir.to_path_buf(),
                source,
            })?;

            if !entry.file_type().is_file() {
                continue;
            }
            if self.filter.should_include(entry.path()) {
                paths.push(entry.into_path());
            } else {
                debug!(path = %entry.path().display(), "skipping unsupported file");
            }
        }

        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(paths)
    }

    /// Decode every supported image in `dir`
    pub fn load_dir(&self, dir: &Path) -> Result<Vec<LoadedImage>, InputError> {
        self.load_dir_with_events(dir, &crate::events::null_sender())
    }

    /// Decode every supported image in `dir`, reporting progress
    pub fn load_dir_with_events(
        &self,
        dir: &Path,
        events: &EventSender,
    ) -> Result<Vec<LoadedImage>, InputError> {
        let paths = self.discover(dir)?;
        if paths.is_empty() {
            return Err(InputError::NoImages {
                path: dir.to_path_buf(),
            });
        }

        events.send(Event::Load(LoadEvent::Started {
            total_images: paths.len(),
        }));

        let images = paths
            .par_iter()
            .enumerate()
            .map(|(index, path)| {
                let image = self.load_one(index, path)?;
                events.send(Event::Load(LoadEvent::ImageLoaded {
                    index,
                    path: path.clone(),
                }));
                Ok(image)
            })
            .collect::<Result<Vec<_>, InputError>>()?;

        info!(count = images.len(), dir = %dir.display(), "loaded images");
        events.send(Event::Load(LoadEvent::Completed {
            total_images: images.len(),
        }));

        Ok(images)
    }

    fn load_one(&self, index: usize, path: &Path) -> Result<LoadedImage, InputError> {
        let decoded = FastDecoder::decode(path)?;
        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(InputError::DecodeError {
                path: path.to_path_buf(),
                reason: "image has no pixels".to_string(),
            });
        }

        let (original_width, original_height) = (decoded.width(), decoded.height());
        let pixels = downscale(decoded, self.resize_max);
        debug!(
            path = %path.display(),
            original = ?(original_width, original_height),
            loaded = ?(pixels.width(), pixels.height()),
            "decoded image"
        );

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(LoadedImage {
            index,
            name,
            path: path.to_path_buf(),
            pixels,
        })
    }
}
