//! DBSCAN over a precomputed distance matrix.
//!
//! - Neighbourhood of `i`: every `j` with `d(i, j) <= eps`, `i` included.
//! - Core point: neighbourhood holds at least `min_samples` points.
//! - Clusters grow from unvisited core points in index order. A border point
//!   joins the first cluster that reaches it. Everything else is noise.

use super::traits::{ClusterAlgorithm, ClusterLabel};
use crate::core::matrix::DistanceMatrix;
use crate::error::ClusterError;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Dbscan {
    eps: f64,
    min_samples: usize,
}

impl Dbscan {
    pub fn new(eps: f64, min_samples: usize) -> Result<Self, ClusterError> {
        if !eps.is_finite() || eps <= 0.0 {
            return Err(ClusterError::InvalidParameters(format!(
                "eps must be a positive number, got {}",
                eps
            )));
        }
        if min_samples == 0 {
            return Err(ClusterError::InvalidParameters(
                "min_samples must be at least 1".to_string(),
            ));
        }
        Ok(Self { eps, min_samples })
    }

    fn neighbours(&self, matrix: &DistanceMatrix, point: usize) -> Vec<usize> {
        matrix
            .row(point)
            .iter()
            .enumerate()
            .filter(|(_, d)| **d <= self.eps)
            .map(|(j, _)| j)
            .collect()
    }
}

impl ClusterAlgorithm for Dbscan {
    fn fit(&self, matrix: &DistanceMatrix) -> Result<Vec<ClusterLabel>, ClusterError> {
        let n = matrix.len();
        let neighbourhoods: Vec<Vec<usize>> = (0..n).map(|i| self.neighbours(matrix, i)).collect();
        let is_core: Vec<bool> = neighbourhoods
            .iter()
            .map(|hood| hood.len() >= self.min_samples)
            .collect();

        let mut labels: Vec<Option<usize>> = vec![None; n];
        let mut next_cluster = 0;

        for seed in 0..n {
            if labels[seed].is_some() || !is_core[seed] {
                continue;
            }

            labels[seed] = Some(next_cluster);
            let mut frontier = vec![seed];
            while let Some(point) = frontier.pop() {
                for &neighbour in &neighbourhoods[point] {
                    if labels[neighbour].is_some() {
                        continue;
                    }
                    labels[neighbour] = Some(next_cluster);
                    // Border points are labelled but never expanded
                    if is_core[neighbour] {
                        frontier.push(neighbour);
                    }
                }
            }
            next_cluster += 1;
        }

        let core_count = is_core.iter().filter(|c| **c).count();
        debug!(
            eps = self.eps,
            min_samples = self.min_samples,
            core_points = core_count,
            clusters = next_cluster,
            "dbscan finished"
        );

        Ok(labels
            .into_iter()
            .map(|label| label.map_or(ClusterLabel::Noise, ClusterLabel::Cluster))
            .collect())
    }

    fn name(&self) -> &'static str {
        "dbscan"
    }
}
