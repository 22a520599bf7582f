//! Trait definitions for clustering strategies.

use crate::core::matrix::DistanceMatrix;
use crate::error::ClusterError;
use serde::{Deserialize, Serialize};

/// Strategy trait for grouping images by distance
pub trait ClusterAlgorithm: Send + Sync {
    /// One label per matrix row, in row order
    fn fit(&self, matrix: &DistanceMatrix) -> Result<Vec<ClusterLabel>, ClusterError>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Group assignment of one image.
///
/// Serialized as an integer with noise as `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum ClusterLabel {
    /// Not part of any cluster; always kept
    Noise,
    Cluster(usize),
}

impl ClusterLabel {
    pub fn is_noise(&self) -> bool {
        matches!(self, ClusterLabel::Noise)
    }

    /// Numeric form used in reports
    pub fn as_i64(&self) -> i64 {
        match self {
            ClusterLabel::Noise => -1,
            ClusterLabel::Cluster(id) => *id as i64,
        }
    }
}

impl From<ClusterLabel> for i64 {
    fn from(label: ClusterLabel) -> Self {
        label.as_i64()
    }
}

impl TryFrom<i64> for ClusterLabel {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(ClusterLabel::Noise),
            id if id >= 0 => Ok(ClusterLabel::Cluster(id as usize)),
            other => Err(format!("invalid cluster label {}", other)),
        }
    }
}

impl std::fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}
