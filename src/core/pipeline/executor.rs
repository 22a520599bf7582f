//! Pipeline execution implementation.

use super::stages;
use crate::config::Config;
use crate::core::cluster::{ClusterLabel, ClusteringConfig};
use crate::core::matrix::DistanceMatrix;
use crate::core::metrics::MetricWeights;
use crate::core::reporter::{build_report_rows, ReportRow, RunSummary};
use crate::core::selector::Selection;
use crate::error::Result;
use crate::events::{null_sender, Event, EventSender, PipelineEvent, PipelinePhase};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunResult {
    pub summary: RunSummary,
    pub heatmap_path: PathBuf,
    pub kept_dir: PathBuf,
    pub removed_dir: PathBuf,
    pub report_csv: PathBuf,
    pub summary_path: PathBuf,
    /// One row per image, in index order
    pub rows: Vec<ReportRow>,
    pub matrix: DistanceMatrix,
    pub labels: Vec<ClusterLabel>,
    pub selection: Selection,
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: Config,
}

impl PipelineBuilder {
    /// Start from the default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Write all outputs under `root`
    pub fn output_root(mut self, root: &Path) -> Self {
        self.config = self.config.with_output_root(root);
        self
    }

    pub fn hash_size(mut self, hash_size: u32) -> Self {
        self.config.hash_size = hash_size;
        self
    }

    pub fn resize_max(mut self, resize_max: u32) -> Self {
        self.config.resize_max = resize_max;
        self
    }

    pub fn weights(mut self, weights: MetricWeights) -> Self {
        self.config.weights = weights;
        self
    }

    pub fn clustering(mut self, clustering: ClusteringConfig) -> Self {
        self.config.clustering = clustering;
        self
    }

    /// Build the pipeline; the configuration is validated when it runs
    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The near-duplicate removal pipeline
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self, input_dir: &Path) -> Result<RunResult> {
        self.run_with_events(input_dir, &null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(&self, input_dir: &Path, events: &EventSender) -> Result<RunResult> {
        events.send(Event::Pipeline(PipelineEvent::Started));

        match self.execute(input_dir, events) {
            Ok(result) => {
                events.send(Event::Pipeline(PipelineEvent::Completed {
                    summary: result.summary.clone(),
                }));
                Ok(result)
            }
            Err(e) => {
                error!(input = %input_dir.display(), error = %e, "run failed");
                events.send(Event::Pipeline(PipelineEvent::Error {
                    message: e.to_string(),
                }));
                Err(e)
            }
        }
    }

    fn execute(&self, input_dir: &Path, events: &EventSender) -> Result<RunResult> {
        let start_time = Instant::now();
        let config = &self.config;
        config.validate()?;

        let phase = |phase: PipelinePhase| {
            info!(%phase, "phase started");
            events.send(Event::Pipeline(PipelineEvent::PhaseChanged { phase }));
        };

        // Phase 1: Loading
        phase(PipelinePhase::Loading);
        let images = stages::load_images(input_dir, config.resize_max, events)?;

        // Phase 2: Hashing
        phase(PipelinePhase::Hashing);
        let hashes = stages::hash_images(&images, config.hash_size, events)?;

        // Phase 3: Pairwise distances
        phase(PipelinePhase::Measuring);
        let matrix = stages::measure(&images, &hashes, &config.weights, events)?;

        // Phase 4: Clustering
        phase(PipelinePhase::Clustering);
        let labels = stages::cluster_images(&matrix, &config.clustering, events)?;

        // Phase 5: Selecting
        phase(PipelinePhase::Selecting);
        let selection = stages::select_representatives(&images, &labels, events)?;
        let rows = build_report_rows(&images, &labels, &selection)?;

        // Phase 6: Writing; nothing touches the output tree before this point
        phase(PipelinePhase::Writing);
        let dirs = &config.output_dirs;
        stages::prepare_output_dirs(dirs)?;
        stages::write_partition(&images, &selection, dirs)?;

        // Phase 7: Reporting
        phase(PipelinePhase::Reporting);
        let reports = stages::write_reports(&matrix, &rows, &dirs.report)?;
        let summary = RunSummary::new(
            images.len(),
            selection.kept.len(),
            start_time.elapsed().as_secs_f64(),
        );
        let summary_path = stages::write_summary(&summary, &dirs.report)?;

        info!(
            total = summary.total_images,
            kept = summary.kept_count,
            removed = summary.removed_count,
            runtime_seconds = summary.runtime_seconds,
            "run complete"
        );

        Ok(RunResult {
            summary,
            heatmap_path: reports.heatmap,
            kept_dir: dirs.kept.clone(),
            removed_dir: dirs.removed.clone(),
            report_csv: reports.csv,
            summary_path,
            rows,
            matrix,
            labels,
            selection,
        })
    }
}
