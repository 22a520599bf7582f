//! # Error Module
//!
//! Error types for the frame sieve.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, offending values
//! - **Fail the whole run** - no stage hands a partial result to the next one

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum FrameSieveError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Metric computation error: {0}")]
    Metric(#[from] MetricError),

    #[error("Clustering error: {0}")]
    Cluster(#[from] ClusterError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),
}

/// Errors raised while reading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write configuration file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid value for `{key}`: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Errors raised while loading the source images
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Input directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("No .jpg, .jpeg or .png images found in {path}")]
    NoImages { path: PathBuf },

    #[error("Failed to decode image {path}: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Failed to open image file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur during image hashing
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Image is empty: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("Invalid hash size: {size} (must be at least 1)")]
    InvalidSize { size: u32 },

    #[error("Hash computation failed: {0}")]
    ComputationFailed(String),
}

/// Errors that occur while computing pairwise distances
#[derive(Error, Debug)]
pub enum MetricError {
    #[error("Hash length mismatch: {left} bits vs {right} bits")]
    HashLengthMismatch { left: u32, right: u32 },

    #[error("Cannot compare {left} hash with {right} hash")]
    HashKindMismatch { left: String, right: String },

    #[error("Image dimensions differ: {left:?} vs {right:?}")]
    DimensionMismatch {
        left: (u32, u32),
        right: (u32, u32),
    },

    #[error("Image {width}x{height} is smaller than the {window}x{window} comparison window")]
    ImageTooSmall { width: u32, height: u32, window: u32 },

    #[error("Distance between {left} and {right} is not a finite number")]
    NonFinite { left: String, right: String },

    #[error("Failed to compare {left} with {right}: {reason}")]
    PairFailed {
        left: String,
        right: String,
        reason: String,
    },
}

/// Errors raised by the clustering stage
#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("Invalid clustering parameter: {0}")]
    InvalidParameters(String),

    #[error("Distance matrix is not square: {rows} rows, row {row} has {len} entries")]
    NotSquare { rows: usize, row: usize, len: usize },

    #[error("Distance matrix entry ({row}, {col}) is not a finite number")]
    NonFiniteDistance { row: usize, col: usize },

    #[error("Got {labels} cluster labels for {images} images")]
    LabelCountMismatch { labels: usize, images: usize },
}

/// Errors raised while writing run artifacts
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write CSV report {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to write heatmap {path}: {source}")]
    Heatmap {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write summary {path}: {reason}")]
    Summary { path: PathBuf, reason: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, FrameSieveError>;
