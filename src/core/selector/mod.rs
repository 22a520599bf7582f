//! # Selector Module
//!
//! Chooses which images survive.
//!
//! - Every noise image is kept.
//! - Each cluster keeps exactly one member, the sharpest; on a tie the
//!   member with the lowest index wins.
//! - Everything else is removed.

use crate::core::cluster::ClusterLabel;
use crate::error::ClusterError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Partition of image indices into kept and removed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Ascending indices of kept images
    pub kept: Vec<usize>,
    /// Ascending indices of removed images
    pub removed: Vec<usize>,
    /// Sharpness score of every image, by index
    pub sharpness: Vec<f64>,
}

impl Selection {
    pub fn is_kept(&self, index: usize) -> bool {
        self.kept.binary_search(&index).is_ok()
    }

    pub fn total(&self) -> usize {
        self.kept.len() + self.removed.len()
    }
}

/// Pick the representatives for a labelled set of images
pub fn select(sharpness: &[f64], labels: &[ClusterLabel]) -> Result<Selection, ClusterError> {
    if sharpness.len() != labels.len() {
        return Err(ClusterError::LabelCountMismatch {
            labels: labels.len(),
            images: sharpness.len(),
        });
    }

    let mut kept = Vec::new();
    let mut removed = Vec::new();
    let mut clusters: BTreeMap<usize, Vec<usize>> = BTreeMap::new();

    for (index, label) in labels.iter().enumerate() {
        match label {
            ClusterLabel::Noise => kept.push(index),
            ClusterLabel::Cluster(id) => clusters.entry(*id).or_default().push(index),
        }
    }

    for (id, members) in &clusters {
        let mut best = members[0];
        for &member in &members[1..] {
            if sharpness[member] > sharpness[best] {
                best = member;
            }
        }
        debug!(cluster = id, members = members.len(), representative = best, "selected representative");

        kept.push(best);
        removed.extend(members.iter().copied().filter(|&m| m != best));
    }

    kept.sort_unstable();
    removed.sort_unstable();
    Ok(Selection {
        kept,
        removed,
        sharpness: sharpness.to_vec(),
    })
}
