//! # Cluster Module
//!
//! Groups images from the precomputed distance matrix.
//!
//! ## Methods
//! - **DBSCAN** (default) - density-based, finds the number of groups itself
//!   and marks isolated frames as noise
//! - **k-means** - experimental; treats each matrix row as a feature vector
//!
//! ## Example
//! ```rust,ignore
//! use frame_sieve::core::cluster::{cluster, ClusteringConfig};
//!
//! let labels = cluster(&matrix, &ClusteringConfig::default())?;
//! ```

mod dbscan;
mod kmeans;
mod traits;

pub use dbscan::Dbscan;
pub use kmeans::{default_k, KMeans};
pub use traits::{ClusterAlgorithm, ClusterLabel};

use crate::core::matrix::DistanceMatrix;
use crate::error::ClusterError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

/// Supported clustering methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusteringMethod {
    Dbscan,
    Kmeans,
}

impl std::fmt::Display for ClusteringMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusteringMethod::Dbscan => write!(f, "dbscan"),
            ClusteringMethod::Kmeans => write!(f, "kmeans"),
        }
    }
}

/// Clustering parameters as read from configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClusteringConfig {
    pub method: ClusteringMethod,
    /// DBSCAN neighbourhood radius
    pub eps: f64,
    /// DBSCAN density threshold, the point itself included
    pub min_samples: usize,
    /// k-means cluster count; `None` derives it from the image count
    pub k: Option<usize>,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            method: ClusteringMethod::Dbscan,
            eps: 0.18,
            min_samples: 2,
            k: None,
        }
    }
}

impl ClusteringConfig {
    /// Instantiate the configured algorithm
    pub fn build(&self) -> Result<Box<dyn ClusterAlgorithm>, ClusterError> {
        match self.method {
            ClusteringMethod::Dbscan => Ok(Box::new(Dbscan::new(self.eps, self.min_samples)?)),
            ClusteringMethod::Kmeans => Ok(Box::new(KMeans::new(self.k)?)),
        }
    }
}

/// Label every row of the matrix
pub fn cluster(
    matrix: &DistanceMatrix,
    config: &ClusteringConfig,
) -> Result<Vec<ClusterLabel>, ClusterError> {
    matrix.validate()?;
    let algorithm = config.build()?;
    let labels = algorithm.fit(matrix)?;

    let (clusters, noise) = count_clusters(&labels);
    info!(method = algorithm.name(), clusters, noise, "clustering complete");
    Ok(labels)
}

/// Number of distinct clusters and number of noise points
pub fn count_clusters(labels: &[ClusterLabel]) -> (usize, usize) {
    let mut ids = BTreeSet::new();
    let mut noise = 0;
    for label in labels {
        match label {
            ClusterLabel::Noise => noise += 1,
            ClusterLabel::Cluster(id) => {
                ids.insert(*id);
            }
        }
    }
    (ids.len(), noise)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_pairs() -> DistanceMatrix {
        DistanceMatrix::from_rows(vec![
            vec![0.0, 0.05, 0.9, 0.8],
            vec![0.05, 0.0, 0.85, 0.9],
            vec![0.9, 0.85, 0.0, 0.1],
            vec![0.8, 0.9, 0.1, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn default_config_is_dbscan() {
        let config = ClusteringConfig::default();
        assert_eq!(config.method, ClusteringMethod::Dbscan);
        assert_eq!(config.eps, 0.18);
        assert_eq!(config.min_samples, 2);
        assert_eq!(config.k, None);
    }

    #[test]
    fn method_names_are_lowercase() {
        let method: ClusteringMethod = serde_yaml::from_str("kmeans").unwrap();
        assert_eq!(method, ClusteringMethod::Kmeans);
        assert_eq!(ClusteringMethod::Dbscan.to_string(), "dbscan");
        assert!(serde_yaml::from_str::<ClusteringMethod>("spectral").is_err());
    }

    #[test]
    fn dbscan_and_kmeans_agree_on_clear_groups() {
        let matrix = two_pairs();
        let dbscan = cluster(&matrix, &ClusteringConfig::default()).unwrap();
        let kmeans = cluster(
            &matrix,
            &ClusteringConfig {
                method: ClusteringMethod::Kmeans,
                k: Some(2),
                ..ClusteringConfig::default()
            },
        )
        .unwrap();

        for labels in [dbscan, kmeans] {
            assert_eq!(labels[0], labels[1]);
            assert_eq!(labels[2], labels[3]);
            assert_ne!(labels[0], labels[2]);
        }
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let config = ClusteringConfig {
            eps: -1.0,
            ..ClusteringConfig::default()
        };
        assert!(matches!(
            cluster(&two_pairs(), &config).unwrap_err(),
            ClusterError::InvalidParameters(_)
        ));
    }

    #[test]
    fn count_clusters_separates_noise() {
        let labels = [
            ClusterLabel::Cluster(0),
            ClusterLabel::Noise,
            ClusterLabel::Cluster(0),
            ClusterLabel::Cluster(3),
            ClusterLabel::Noise,
        ];
        assert_eq!(count_clusters(&labels), (2, 2));
    }

    #[test]
    fn empty_matrix_gives_no_labels() {
        let labels = cluster(&DistanceMatrix::zeros(0), &ClusteringConfig::default()).unwrap();
        assert!(labels.is_empty());
    }
}
