//! Individual pipeline stages.

use crate::config::OutputDirs;
use crate::core::cluster::{self, count_clusters, ClusterLabel, ClusteringConfig};
use crate::core::hasher::ImageHashes;
use crate::core::loader::{ImageLoader, LoadedImage};
use crate::core::matrix::{self, DistanceMatrix};
use crate::core::metrics::MetricWeights;
use crate::core::quality;
use crate::core::reporter::{self, ReportRow, RunSummary, HEATMAP_FILE_NAME, SUMMARY_FILE_NAME};
use crate::core::selector::{self, Selection};
use crate::error::{ClusterError, HashError, InputError, OutputError, Result};
use crate::events::{ClusterEvent, Event, EventSender};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Paths of the files written by [`write_reports`]
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub heatmap: PathBuf,
    pub csv: PathBuf,
}

/// Decode every supported image in `dir`
pub fn load_images(
    dir: &Path,
    resize_max: u32,
    events: &EventSender,
) -> std::result::Result<Vec<LoadedImage>, InputError> {
    ImageLoader::new(resize_max).load_dir_with_events(dir, events)
}

/// Compute both fingerprints of every image
pub fn hash_images(
    images: &[LoadedImage],
    hash_size: u32,
    events: &EventSender,
) -> std::result::Result<Vec<ImageHashes>, HashError> {
    matrix::hash_images(images, hash_size, events)
}

/// Build the distance matrix from precomputed fingerprints
pub fn measure(
    images: &[LoadedImage],
    hashes: &[ImageHashes],
    weights: &MetricWeights,
    events: &EventSender,
) -> Result<DistanceMatrix> {
    matrix::build_from_hashes(images, hashes, weights, events)
}

/// Label every image
pub fn cluster_images(
    matrix: &DistanceMatrix,
    config: &ClusteringConfig,
    events: &EventSender,
) -> std::result::Result<Vec<ClusterLabel>, ClusterError> {
    let labels = cluster::cluster(matrix, config)?;
    let (clusters, noise) = count_clusters(&labels);
    events.send(Event::Cluster(ClusterEvent::Clustered { clusters, noise }));
    Ok(labels)
}

/// Score sharpness and pick one representative per cluster
pub fn select_representatives(
    images: &[LoadedImage],
    labels: &[ClusterLabel],
    events: &EventSender,
) -> std::result::Result<Selection, ClusterError> {
    let sharpness = quality::compute_sharpness(images);
    let selection = selector::select(&sharpness, labels)?;
    info!(
        kept = selection.kept.len(),
        removed = selection.removed.len(),
        "selected representatives"
    );
    events.send(Event::Cluster(ClusterEvent::Selected {
        kept: selection.kept.len(),
        removed: selection.removed.len(),
    }));
    Ok(selection)
}

/// Create the kept, removed and report directories
pub fn prepare_output_dirs(dirs: &OutputDirs) -> std::result::Result<(), OutputError> {
    for dir in [&dirs.kept, &dirs.removed, &dirs.report] {
        fs::create_dir_all(dir).map_err(|source| OutputError::CreateDirectory {
            path: dir.clone(),
            source,
        })?;
    }
    Ok(())
}

/// Copy each original file into the kept or removed directory, keeping its name
pub fn write_partition(
    images: &[LoadedImage],
    selection: &Selection,
    dirs: &OutputDirs,
) -> std::result::Result<(), OutputError> {
    let copy_into = |index: usize, dir: &Path| -> std::result::Result<(), OutputError> {
        let image = &images[index];
        let target = dir.join(&image.name);
        fs::copy(&image.path, &target).map_err(|source| OutputError::Copy {
            from: image.path.clone(),
            to: target.clone(),
            source,
        })?;
        debug!(from = %image.path.display(), to = %target.display(), "copied image");
        Ok(())
    };

    for &index in &selection.kept {
        copy_into(index, &dirs.kept)?;
    }
    for &index in &selection.removed {
        copy_into(index, &dirs.removed)?;
    }
    Ok(())
}

/// Write the heatmap and CSV report into `report_dir`
pub fn write_reports(
    matrix: &DistanceMatrix,
    rows: &[ReportRow],
    report_dir: &Path,
) -> std::result::Result<ReportPaths, OutputError> {
    let heatmap = report_dir.join(HEATMAP_FILE_NAME);
    reporter::write_heatmap(matrix, &heatmap)?;
    let csv = reporter::write_report_csv(rows, report_dir)?;
    Ok(ReportPaths { heatmap, csv })
}

/// Write `summary.json` into `report_dir`
pub fn write_summary(
    summary: &RunSummary,
    report_dir: &Path,
) -> std::result::Result<PathBuf, OutputError> {
    let path = report_dir.join(SUMMARY_FILE_NAME);
    reporter::write_summary(summary, &path)?;
    Ok(path)
}
