//! # Reporter Module
//!
//! Turns a finished run into artifacts a person can check.
//!
//! - **Report rows** - one line per image: name, cluster, kept, sharpness
//! - **CSV report** - the rows, timestamped per run
//! - **Heatmap** - the distance matrix as a PNG
//! - **Summary** - counts and runtime as JSON

mod export;
mod heatmap;

pub use export::{export_csv, report_file_name, write_report_csv};
pub use heatmap::{colormap, render_heatmap, write_heatmap, HEATMAP_FILE_NAME, HEATMAP_TARGET_SIDE};

use crate::core::cluster::ClusterLabel;
use crate::core::loader::LoadedImage;
use crate::core::selector::Selection;
use crate::error::{ClusterError, OutputError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name of the JSON summary inside the report directory
pub const SUMMARY_FILE_NAME: &str = "summary.json";

/// Scalar outcome of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_images: usize,
    pub kept_count: usize,
    pub removed_count: usize,
    /// Share of removed images, in percent, two decimals
    pub removed_percentage: f64,
    pub runtime_seconds: f64,
}

impl RunSummary {
    pub fn new(total_images: usize, kept_count: usize, runtime_seconds: f64) -> Self {
        let removed_count = total_images.saturating_sub(kept_count);
        let removed_percentage = if total_images == 0 {
            0.0
        } else {
            (removed_count as f64 / total_images as f64 * 10_000.0).round() / 100.0
        };

        Self {
            total_images,
            kept_count,
            removed_count,
            removed_percentage,
            runtime_seconds,
        }
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} images: kept {}, removed {} ({:.2}%) in {:.2}s",
            self.total_images,
            self.kept_count,
            self.removed_count,
            self.removed_percentage,
            self.runtime_seconds
        )
    }
}

/// One CSV line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub name: String,
    pub cluster: ClusterLabel,
    pub kept: bool,
    pub sharpness: f64,
}

/// Rows for every image, in index order
pub fn build_report_rows(
    images: &[LoadedImage],
    labels: &[ClusterLabel],
    selection: &Selection,
) -> Result<Vec<ReportRow>, ClusterError> {
    if labels.len() != images.len() || selection.sharpness.len() != images.len() {
        return Err(ClusterError::LabelCountMismatch {
            labels: labels.len(),
            images: images.len(),
        });
    }

    Ok(images
        .iter()
        .zip(labels)
        .zip(&selection.sharpness)
        .enumerate()
        .map(|(index, ((image, label), score))| ReportRow {
            name: image.name.clone(),
            cluster: *label,
            kept: selection.is_kept(index),
            sharpness: *score,
        })
        .collect())
}

/// Write the summary as pretty-printed JSON
pub fn write_summary(summary: &RunSummary, path: &Path) -> Result<(), OutputError> {
    let failed = |reason: String| OutputError::Summary {
        path: path.to_path_buf(),
        reason,
    };
    let json = serde_json::to_string_pretty(summary).map_err(|e| failed(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| failed(e.to_string()))
}
