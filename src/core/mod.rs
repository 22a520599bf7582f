//! # Core Module
//!
//! The front-end agnostic near-duplicate removal engine.
//!
//! ## Modules
//! - `loader` - Discovers, decodes and downscales source images
//! - `hasher` - Computes pHash and dHash fingerprints
//! - `metrics` - Hamming distance, SSIM and the weighted combination
//! - `matrix` - Builds the pairwise distance matrix
//! - `cluster` - DBSCAN and k-means over the matrix
//! - `quality` - Laplacian-variance sharpness
//! - `selector` - Keeps the sharpest image per cluster
//! - `reporter` - CSV report, heatmap and run summary
//! - `pipeline` - Orchestrates the full workflow

pub mod cluster;
pub mod hasher;
pub mod loader;
pub mod matrix;
pub mod metrics;
pub mod pipeline;
pub mod quality;
pub mod reporter;
pub mod selector;

// Re-export commonly used types
pub use cluster::{ClusterLabel, ClusteringConfig, ClusteringMethod};
pub use hasher::{HashAlgorithmKind, ImageHashes, PerceptualHash};
pub use loader::LoadedImage;
pub use matrix::DistanceMatrix;
pub use metrics::MetricWeights;
pub use pipeline::{Pipeline, RunResult};
pub use reporter::{ReportRow, RunSummary};
pub use selector::Selection;
