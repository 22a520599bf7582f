//! # Config Module
//!
//! Run configuration loaded from YAML.
//!
//! Every key is optional and falls back to the defaults below. Unknown keys
//! and unknown clustering methods are rejected at parse time, before the
//! pipeline touches the filesystem.
//!
//! ```yaml
//! output_dirs:
//!   kept: outputs/kept_images
//!   removed: outputs/removed_images
//!   report: outputs/reports
//! hash_size: 16
//! resize_max: 1024
//! weights: { phash: 0.4, dhash: 0.3, ssim: 0.3 }
//! clustering: { method: dbscan, eps: 0.18, min_samples: 2, k: null }
//! ```

use crate::core::cluster::{ClusteringConfig, ClusteringMethod};
use crate::core::metrics::MetricWeights;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Where run artifacts are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputDirs {
    /// Copies of the representative images
    pub kept: PathBuf,
    /// Copies of the redundant images
    pub removed: PathBuf,
    /// CSV report, heatmap and summary
    pub report: PathBuf,
}

impl OutputDirs {
    /// Lay out the three directories under a common root
    pub fn under(root: &Path) -> Self {
        Self {
            kept: root.join("kept_images"),
            removed: root.join("removed_images"),
            report: root.join("reports"),
        }
    }
}

impl Default for OutputDirs {
    fn default() -> Self {
        Self::under(Path::new("outputs"))
    }
}

/// Full configuration for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub output_dirs: OutputDirs,
    /// Hash grid side; each hash has `hash_size²` bits
    pub hash_size: u32,
    /// Longest side of a loaded image, larger images are downscaled
    pub resize_max: u32,
    pub weights: MetricWeights,
    pub clustering: ClusteringConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dirs: OutputDirs::default(),
            hash_size: 16,
            resize_max: 1024,
            weights: MetricWeights::default(),
            clustering: ClusteringConfig::default(),
        }
    }
}

impl Config {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Serialize back to YAML (used by `init-config`)
    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write as YAML; an existing file is only replaced when `overwrite` is set
    pub fn write_yaml_file(&self, path: &Path, overwrite: bool) -> Result<(), ConfigError> {
        let yaml = self.to_yaml_string()?;
        let write_error = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        let mut file = OpenOptions::new()
            .write(true)
            .create(overwrite)
            .truncate(overwrite)
            .create_new(!overwrite)
            .open(path)
            .map_err(write_error)?;
        file.write_all(yaml.as_bytes()).map_err(write_error)
    }

    /// Replace the output directories with the standard layout under `root`
    pub fn with_output_root(mut self, root: &Path) -> Self {
        self.output_dirs = OutputDirs::under(root);
        self
    }

    /// Check value ranges that the type system cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hash_size == 0 {
            return Err(invalid("hash_size", "must be at least 1"));
        }
        if self.resize_max == 0 {
            return Err(invalid("resize_max", "must be at least 1"));
        }

        let weights = [
            ("weights.phash", self.weights.phash),
            ("weights.dhash", self.weights.dhash),
            ("weights.ssim", self.weights.ssim),
        ];
        for (key, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(key, format!("{} is not a non-negative number", value)));
            }
        }

        let clustering = &self.clustering;
        match clustering.method {
            ClusteringMethod::Dbscan => {
                if !clustering.eps.is_finite() || clustering.eps <= 0.0 {
                    return Err(invalid(
                        "clustering.eps",
                        format!("{} is not a positive number", clustering.eps),
                    ));
                }
                if clustering.min_samples == 0 {
                    return Err(invalid("clustering.min_samples", "must be at least 1"));
                }
            }
            ClusteringMethod::Kmeans => {
                if clustering.k == Some(0) {
                    return Err(invalid("clustering.k", "must be at least 1"));
                }
            }
        }

        Ok(())
    }
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        reason: reason.into(),
    }
}
