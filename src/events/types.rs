//! Event type definitions for progress reporting.

use crate::core::reporter::RunSummary;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted during a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Image loading
    Load(LoadEvent),
    /// Fingerprinting
    Hash(HashEvent),
    /// Pairwise distance computation
    Matrix(MatrixEvent),
    /// Clustering and representative selection
    Cluster(ClusterEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events while decoding the source directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LoadEvent {
    /// Enumeration finished, decoding is about to start
    Started { total_images: usize },
    /// One image decoded and downscaled
    ImageLoaded { index: usize, path: PathBuf },
    /// All images are in memory
    Completed { total_images: usize },
}

/// Events while computing fingerprints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HashEvent {
    Started { total_images: usize },
    Completed { total_hashed: usize },
}

/// Events while filling the distance matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MatrixEvent {
    /// Matrix build started
    Started { total_pairs: usize },
    /// A row of the upper triangle is finished
    Progress(MatrixProgress),
    /// Matrix is complete and symmetric
    Completed { total_pairs: usize },
}

/// Progress of the pairwise loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixProgress {
    pub pairs_completed: usize,
    pub total_pairs: usize,
}

/// Events from clustering and selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClusterEvent {
    /// Labels assigned
    Clustered {
        clusters: usize,
        noise: usize,
    },
    /// Representatives chosen
    Selected { kept: usize, removed: usize },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    Started,
    PhaseChanged { phase: PipelinePhase },
    Completed { summary: RunSummary },
    Error { message: String },
}

/// Stages of a run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Loading,
    Hashing,
    Measuring,
    Clustering,
    Selecting,
    Writing,
    Reporting,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Loading => write!(f, "Loading images"),
            PipelinePhase::Hashing => write!(f, "Hashing"),
            PipelinePhase::Measuring => write!(f, "Measuring distances"),
            PipelinePhase::Clustering => write!(f, "Clustering"),
            PipelinePhase::Selecting => write!(f, "Selecting representatives"),
            PipelinePhase::Writing => write!(f, "Writing images"),
            PipelinePhase::Reporting => write!(f, "Reporting"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Matrix(MatrixEvent::Progress(MatrixProgress {
            pairs_completed: 45,
            total_pairs: 190,
        }));

        let json = serde_json::to_string(&event).unwrap();
        let restored: Event = serde_json::from_str(&json).unwrap();

        match restored {
            Event::Matrix(MatrixEvent::Progress(p)) => assert_eq!(p.total_pairs, 190),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn completed_event_carries_summary() {
        let event = Event::Pipeline(PipelineEvent::Completed {
            summary: RunSummary::new(20, 12, 1.5),
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"removed_count\":8"));
    }

    #[test]
    fn phase_display_is_human_readable() {
        assert_eq!(PipelinePhase::Measuring.to_string(), "Measuring distances");
    }
}
