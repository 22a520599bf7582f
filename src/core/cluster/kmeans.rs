//! k-means (Lloyd) over distance-matrix rows.
//!
//! Each row is used as a feature vector, which only approximates a proper
//! embedding of the images; DBSCAN is the primary method. Seeding is
//! deterministic farthest-point selection starting at row 0, so repeated
//! runs give identical labels.

use super::traits::{ClusterAlgorithm, ClusterLabel};
use crate::core::matrix::DistanceMatrix;
use crate::error::ClusterError;
use tracing::{debug, warn};

const MAX_ITERATIONS: usize = 300;
const TOLERANCE: f64 = 1e-4;

/// `max(1, floor(sqrt(n / 2)))`
pub fn default_k(n: usize) -> usize {
    ((n as f64 / 2.0).sqrt().floor() as usize).max(1)
}

#[derive(Debug, Clone)]
pub struct KMeans {
    k: Option<usize>,
}

impl KMeans {
    /// `k = None` derives the cluster count from the number of images
    pub fn new(k: Option<usize>) -> Result<Self, ClusterError> {
        if k == Some(0) {
            return Err(ClusterError::InvalidParameters("k must be at least 1".to_string()));
        }
        Ok(Self { k })
    }

    fn seed(&self, points: &[&[f64]], k: usize) -> Vec<Vec<f64>> {
        let mut centroids = vec![points[0].to_vec()];
        let mut chosen = vec![false; points.len()];
        chosen[0] = true;

        while centroids.len() < k {
            let mut best: Option<(usize, f64)> = None;
            for (i, point) in points.iter().enumerate() {
                if chosen[i] {
                    continue;
                }
                let nearest = centroids
                    .iter()
                    .map(|c| squared_distance(point, c))
                    .fold(f64::INFINITY, f64::min);
                if best.map_or(true, |(_, d)| nearest > d) {
                    best = Some((i, nearest));
                }
            }
            match best {
                Some((i, _)) => {
                    chosen[i] = true;
                    centroids.push(points[i].to_vec());
                }
                None => break,
            }
        }
        centroids
    }
}

impl ClusterAlgorithm for KMeans {
    fn fit(&self, matrix: &DistanceMatrix) -> Result<Vec<ClusterLabel>, ClusterError> {
        let n = matrix.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let k = self.k.unwrap_or_else(|| default_k(n));
        if k == 0 || k > n {
            return Err(ClusterError::InvalidParameters(format!(
                "k = {} is out of range for {} images",
                k, n
            )));
        }
        warn!(k, "k-means clusters distance-matrix rows as feature vectors; prefer dbscan");

        let points: Vec<&[f64]> = matrix.rows().collect();
        let mut centroids = self.seed(&points, k);
        let mut assignment = assign(&points, &centroids);
        let mut converged = false;

        for iteration in 1..=MAX_ITERATIONS {
            let updated = recompute(&points, &assignment, &centroids);
            let shift = centroids
                .iter()
                .zip(&updated)
                .map(|(old, new)| squared_distance(old, new).sqrt())
                .fold(0.0, f64::max);
            centroids = updated;
            assignment = assign(&points, &centroids);

            if shift <= TOLERANCE {
                debug!(iteration, shift, "k-means converged");
                converged = true;
                break;
            }
        }
        if !converged {
            warn!(
                max_iterations = MAX_ITERATIONS,
                "k-means stopped at the iteration cap without converging"
            );
        }

        Ok(compact_labels(&assignment))
    }

    fn name(&self) -> &'static str {
        "kmeans"
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Nearest centroid per point, ties to the lowest centroid index
fn assign(points: &[&[f64]], centroids: &[Vec<f64>]) -> Vec<usize> {
    points
        .iter()
        .map(|point| {
            let mut best = 0;
            let mut best_distance = f64::INFINITY;
            for (c, centroid) in centroids.iter().enumerate() {
                let distance = squared_distance(point, centroid);
                if distance < best_distance {
                    best = c;
                    best_distance = distance;
                }
            }
            best
        })
        .collect()
}

/// Mean of each cluster's members; an empty cluster keeps its centroid
fn recompute(points: &[&[f64]], assignment: &[usize], centroids: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let dims = centroids.first().map_or(0, Vec::len);
    let mut sums = vec![vec![0.0; dims]; centroids.len()];
    let mut counts = vec![0usize; centroids.len()];

    for (point, &c) in points.iter().zip(assignment) {
        counts[c] += 1;
        for (sum, value) in sums[c].iter_mut().zip(point.iter()) {
            *sum += value;
        }
    }

    sums.into_iter()
        .zip(counts)
        .zip(centroids)
        .map(|((sum, count), old)| {
            if count == 0 {
                old.clone()
            } else {
                sum.into_iter().map(|s| s / count as f64).collect()
            }
        })
        .collect()
}

/// Renumber clusters densely in order of first appearance
fn compact_labels(assignment: &[usize]) -> Vec<ClusterLabel> {
    let mut mapping: Vec<Option<usize>> = vec![None; assignment.iter().max().map_or(0, |m| m + 1)];
    let mut next = 0;
    assignment
        .iter()
        .map(|&c| {
            let id = *mapping[c].get_or_insert_with(|| {
                next += 1;
                next - 1
            });
            ClusterLabel::Cluster(id)
        })
        .collect()
}
