//! Integration tests for the pipeline module.
//!
//! These tests verify end-to-end pipeline behavior including:
//! - A near-duplicate pair next to a distinct frame
//! - Single-image and all-distinct inputs
//! - Configuration and input errors leaving no output behind
//! - Determinism and the kept/removed partition

use frame_sieve::config::Config;
use frame_sieve::core::cluster::{ClusterLabel, ClusteringConfig, ClusteringMethod};
use frame_sieve::core::metrics::MetricWeights;
use frame_sieve::core::pipeline::{Pipeline, RunResult};
use frame_sieve::core::reporter::RunSummary;
use frame_sieve::error::{ConfigError, FrameSieveError, InputError};
use image::{DynamicImage, ImageBuffer, Luma, Rgb, RgbImage};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Horizontal ramp with large bright and dark blocks and sharp edges
fn scene(width: u32, height: u32) -> RgbImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        let ramp = (x * 120 / width) as i32;
        let block = match ((x / 16) + 2 * (y / 16)) % 3 {
            0 => 0,
            1 => 70,
            _ => -40,
        };
        let v = (90 + ramp + block).clamp(0, 255) as u8;
        Rgb([v, v.saturating_add(10), v.saturating_sub(10)])
    })
}

fn inverted(image: &RgbImage) -> RgbImage {
    ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
        let p = image.get_pixel(x, y);
        Rgb([255 - p[0], 255 - p[1], 255 - p[2]])
    })
}

fn stripes(width: u32, height: u32) -> RgbImage {
    ImageBuffer::from_fn(width, height, |_, y| {
        let v = if (y / 5) % 2 == 0 { 230 } else { 25 };
        Rgb([v, v, v])
    })
}

fn checkerboard(width: u32, height: u32) -> RgbImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        let v = if (x / 3 + y / 3) % 2 == 0 { 200 } else { 40 };
        Rgb([v, 255 - v, v])
    })
}

fn blurred(image: &RgbImage) -> RgbImage {
    DynamicImage::ImageRgb8(image.clone()).blur(0.8).to_rgb8()
}

fn save(dir: &Path, name: &str, image: &RgbImage) {
    image.save(dir.join(name)).unwrap();
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn names_in(dir: &Path) -> BTreeSet<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

fn run_default(input: &Path, output_root: &Path) -> RunResult {
    Pipeline::builder()
        .output_root(output_root)
        .build()
        .run(input)
        .unwrap()
}

/// a.png sharp, b.png a softened copy, c.png an unrelated frame
fn duplicate_pair_scene(dir: &Path) {
    let base = scene(128, 96);
    save(dir, "a.png", &base);
    save(dir, "b.png", &blurred(&base));
    save(dir, "c.png", &inverted(&base));
}

#[test]
fn near_duplicates_keep_the_sharper_frame() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    duplicate_pair_scene(input.path());

    let result = run_default(input.path(), output.path());

    assert_eq!(result.labels[0], result.labels[1]);
    assert!(!result.labels[0].is_noise());
    assert_eq!(result.labels[2], ClusterLabel::Noise);

    assert_eq!(names_in(&result.kept_dir), set(&["a.png", "c.png"]));
    assert_eq!(names_in(&result.removed_dir), set(&["b.png"]));

    assert_eq!(result.summary.total_images, 3);
    assert_eq!(result.summary.kept_count, 2);
    assert_eq!(result.summary.removed_count, 1);
    assert_eq!(result.summary.removed_percentage, 33.33);
    assert!(result.rows[0].sharpness > result.rows[1].sharpness);
}

#[test]
fn exact_copy_is_removed_and_unrelated_frame_kept() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    save(input.path(), "A.png", &scene(128, 96));
    fs::copy(input.path().join("A.png"), input.path().join("B.png")).unwrap();
    save(input.path(), "C.jpg", &checkerboard(128, 96));

    let result = run_default(input.path(), output.path());

    assert_eq!(result.matrix.get(0, 1), 0.0);
    assert_eq!(result.labels[0], result.labels[1]);
    assert!(!result.labels[0].is_noise());
    assert_eq!(result.labels[2], ClusterLabel::Noise);

    // Identical sharpness: the first file in name order is the representative
    assert_eq!(result.selection.kept, vec![0, 2]);
    assert_eq!(result.selection.removed, vec![1]);
    assert_eq!(names_in(&result.kept_dir), set(&["A.png", "C.jpg"]));
    assert_eq!(names_in(&result.removed_dir), set(&["B.png"]));
}

#[test]
fn single_image_is_kept() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    save(input.path(), "only.png", &scene(64, 48));

    let result = run_default(input.path(), output.path());

    assert_eq!(result.selection.kept, vec![0]);
    assert!(result.selection.removed.is_empty());
    assert_eq!(result.summary.removed_percentage, 0.0);
    assert_eq!(result.matrix.len(), 1);
    assert_eq!(names_in(&result.kept_dir), set(&["only.png"]));
    assert!(names_in(&result.removed_dir).is_empty());
}

#[test]
fn distinct_frames_are_all_kept() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let base = scene(96, 96);
    save(input.path(), "1.png", &base);
    save(input.path(), "2.png", &inverted(&base));
    save(input.path(), "3.png", &stripes(96, 96));
    save(input.path(), "4.png", &checkerboard(96, 96));

    let result = run_default(input.path(), output.path());

    assert!(result.labels.iter().all(|label| label.is_noise()));
    assert_eq!(result.summary.kept_count, 4);
    assert_eq!(result.summary.removed_count, 0);
    assert!(names_in(&result.removed_dir).is_empty());
}

#[test]
fn unsupported_method_fails_before_any_output() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let settings = TempDir::new().unwrap();
    duplicate_pair_scene(input.path());

    let config_path = settings.path().join("sieve.yaml");
    fs::write(&config_path, "clustering:\n  method: spectral\n  eps: 0.2\n").unwrap();

    let run_root = output.path().join("run");
    let result = Config::from_yaml_file(&config_path)
        .map_err(FrameSieveError::from)
        .and_then(|config| Pipeline::new(config.with_output_root(&run_root)).run(input.path()));

    assert!(matches!(
        result,
        Err(FrameSieveError::Config(ConfigError::Parse(_)))
    ));
    assert!(!run_root.exists());
    assert!(fs::read_dir(output.path()).unwrap().next().is_none());
}

#[test]
fn invalid_config_is_rejected_by_the_pipeline() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    duplicate_pair_scene(input.path());

    let result = Pipeline::builder()
        .output_root(&output.path().join("run"))
        .hash_size(0)
        .build()
        .run(input.path());

    assert!(matches!(result, Err(FrameSieveError::Config(_))));
    assert!(!output.path().join("run").exists());
}

#[test]
fn empty_directory_is_an_input_error() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    fs::write(input.path().join("readme.txt"), "no images here").unwrap();

    let result = Pipeline::builder()
        .output_root(&output.path().join("run"))
        .build()
        .run(input.path());

    assert!(matches!(
        result,
        Err(FrameSieveError::Input(InputError::NoImages { .. }))
    ));
    assert!(!output.path().join("run").exists());
}

#[test]
fn corrupt_file_aborts_the_run() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    save(input.path(), "good.png", &scene(64, 48));
    fs::write(input.path().join("corrupt.jpg"), b"this is not a valid image file").unwrap();

    let result = Pipeline::builder()
        .output_root(&output.path().join("run"))
        .build()
        .run(input.path());

    assert!(matches!(
        result,
        Err(FrameSieveError::Input(InputError::DecodeError { .. }))
    ));
    assert!(!output.path().join("run").exists());
}

#[test]
fn nonexistent_input_is_an_input_error() {
    let output = TempDir::new().unwrap();
    let result = Pipeline::builder()
        .output_root(output.path())
        .build()
        .run(Path::new("/nonexistent/path/that/does/not/exist"));

    assert!(matches!(
        result,
        Err(FrameSieveError::Input(InputError::DirectoryNotFound { .. }))
    ));
}

#[test]
fn repeated_runs_are_identical() {
    let input = TempDir::new().unwrap();
    duplicate_pair_scene(input.path());
    save(input.path(), "d.png", &stripes(128, 96));

    let first_out = TempDir::new().unwrap();
    let second_out = TempDir::new().unwrap();
    let first = run_default(input.path(), first_out.path());
    let second = run_default(input.path(), second_out.path());

    assert_eq!(first.matrix, second.matrix);
    assert_eq!(first.labels, second.labels);
    assert_eq!(first.selection, second.selection);
    assert_eq!(first.rows, second.rows);
}

#[test]
fn outputs_partition_the_input() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    duplicate_pair_scene(input.path());
    save(input.path(), "d.png", &stripes(128, 96));
    save(input.path(), "e.png", &checkerboard(128, 96));

    let result = run_default(input.path(), output.path());

    let kept = names_in(&result.kept_dir);
    let removed = names_in(&result.removed_dir);
    let all = set(&["a.png", "b.png", "c.png", "d.png", "e.png"]);
    assert!(kept.is_disjoint(&removed));
    assert_eq!(kept.union(&removed).cloned().collect::<BTreeSet<_>>(), all);

    assert!(result.matrix.is_symmetric(0.0));
    assert!(result.matrix.rows().flatten().all(|d| *d >= 0.0));

    // Every non-noise cluster keeps exactly its sharpest member
    for row in &result.rows {
        if row.cluster.is_noise() {
            assert!(row.kept);
        }
    }
    let clusters: BTreeSet<ClusterLabel> = result
        .labels
        .iter()
        .copied()
        .filter(|label| !label.is_noise())
        .collect();
    for cluster in clusters {
        let members: Vec<_> = result.rows.iter().filter(|r| r.cluster == cluster).collect();
        let kept: Vec<_> = members.iter().filter(|r| r.kept).collect();
        assert_eq!(kept.len(), 1);
        let best = members.iter().map(|r| r.sharpness).fold(f64::MIN, f64::max);
        assert_eq!(kept[0].sharpness, best);
    }
}

#[test]
fn report_artifacts_are_written() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    duplicate_pair_scene(input.path());

    let result = run_default(input.path(), output.path());

    assert!(result.heatmap_path.ends_with("similarity_heatmap.png"));
    let heatmap = image::open(&result.heatmap_path).unwrap();
    assert_eq!(heatmap.width(), heatmap.height());

    let csv_name = result.report_csv.file_name().unwrap().to_string_lossy().into_owned();
    assert!(csv_name.starts_with("reduvis_report_"));
    assert!(csv_name.ends_with(".csv"));
    let mut reader = csv::Reader::from_path(&result.report_csv).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, vec!["name", "cluster", "kept", "sharpness"]);
    let names: Vec<String> = reader
        .records()
        .map(|record| record.unwrap()[0].to_string())
        .collect();
    assert_eq!(names, vec!["a.png", "b.png", "c.png"]);

    let summary: RunSummary =
        serde_json::from_str(&fs::read_to_string(&result.summary_path).unwrap()).unwrap();
    assert_eq!(summary.total_images, 3);
    assert_eq!(summary.kept_count, result.summary.kept_count);
}

#[test]
fn kmeans_run_assigns_every_image_to_a_cluster() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    duplicate_pair_scene(input.path());
    save(input.path(), "d.png", &stripes(128, 96));

    let result = Pipeline::builder()
        .output_root(output.path())
        .clustering(ClusteringConfig {
            method: ClusteringMethod::Kmeans,
            k: None,
            ..ClusteringConfig::default()
        })
        .build()
        .run(input.path())
        .unwrap();

    // k = floor(sqrt(4 / 2)) = 1
    assert!(result.labels.iter().all(|label| *label == ClusterLabel::Cluster(0)));
    assert_eq!(result.summary.kept_count, 1);
    assert_eq!(result.summary.removed_count, 3);
}

#[test]
fn hash_only_weights_skip_ssim() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let base = scene(128, 96);
    save(input.path(), "a.png", &base);
    save(input.path(), "b.png", &base);

    let result = Pipeline::builder()
        .output_root(output.path())
        .weights(MetricWeights {
            phash: 0.5,
            dhash: 0.5,
            ssim: 0.0,
        })
        .build()
        .run(input.path())
        .unwrap();

    assert_eq!(result.matrix.get(0, 1), 0.0);
    // Equal sharpness: the first file wins
    assert_eq!(result.selection.kept, vec![0]);
    assert_eq!(result.selection.removed, vec![1]);
}

#[test]
fn mixed_sizes_and_formats_are_compared() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let base = scene(160, 120);
    save(input.path(), "large.png", &base);
    DynamicImage::ImageRgb8(base.clone())
        .resize_exact(120, 90, image::imageops::FilterType::Triangle)
        .to_rgb8()
        .save(input.path().join("small.jpg"))
        .unwrap();
    let gray: ImageBuffer<Luma<u8>, Vec<u8>> = DynamicImage::ImageRgb8(stripes(90, 120)).to_luma8();
    gray.save(input.path().join("tall.png")).unwrap();

    let result = run_default(input.path(), output.path());

    assert_eq!(result.rows.len(), 3);
    assert!(result.matrix.rows().flatten().all(|d| d.is_finite()));
    assert_eq!(result.rows[0].name, "large.png");
}
