//! Decides which directory entries are source images.

use std::collections::HashSet;
use std::path::Path;

/// Accepts `.jpg`, `.jpeg` and `.png` files, case-insensitively.
/// Dot-files are always skipped.
pub struct ImageFilter {
    extensions: HashSet<String>,
}

impl ImageFilter {
    pub fn new() -> Self {
        Self {
            extensions: ["jpg", "jpeg", "png"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    /// Check if a file should be loaded
    pub fn should_include(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };

        if name.starts_with('.') {
            return false;
        }

        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::new()
    }
}
