//! # CLI Module
//!
//! Command-line interface for the near-duplicate frame remover.
//!
//! ## Usage
//! ```bash
//! # Filter a directory with the default configuration
//! frame-sieve run ./scans/site_a
//!
//! # Custom configuration and output location
//! frame-sieve run ./scans/site_a --config sieve.yaml --output-root ./runs/a
//!
//! # JSON output for scripting
//! frame-sieve run ./scans/site_a --output json
//!
//! # Write the default configuration
//! frame-sieve init-config sieve.yaml
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use frame_sieve::config::Config;
use frame_sieve::core::pipeline::{Pipeline, RunResult};
use frame_sieve::error::Result;
use frame_sieve::events::{Event, EventChannel, LoadEvent, MatrixEvent, PipelineEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::thread;

/// Frame Sieve - drop redundant frames before reconstruction
#[derive(Parser, Debug)]
#[command(name = "frame-sieve")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Filter a directory of images
    Run {
        /// Directory holding the source images
        input_dir: PathBuf,

        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Put kept_images/, removed_images/ and reports/ under this directory
        #[arg(long)]
        output_root: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Write the default configuration as YAML
    InitConfig {
        /// Target file
        #[arg(default_value = "frame-sieve.yaml")]
        path: PathBuf,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input_dir,
            config,
            output_root,
            output,
            verbose,
        } => run_filter(&input_dir, config, output_root, output, verbose),
        Commands::InitConfig { path, force } => init_config(&path, force),
    }
}

fn run_filter(
    input_dir: &Path,
    config_path: Option<PathBuf>,
    output_root: Option<PathBuf>,
    output: OutputFormat,
    verbose: bool,
) -> Result<()> {
    frame_sieve::init_tracing(verbose);
    let term = Term::stderr();

    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Frame Sieve").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let mut config = match config_path {
        Some(path) => Config::from_yaml_file(&path)?,
        None => Config::default(),
    };
    if let Some(root) = output_root {
        config = config.with_output_root(&root);
    }

    let pipeline = Pipeline::builder().config(config).build();

    // Set up event handling
    let (sender, receiver) = EventChannel::new();

    // Progress bar for pretty output
    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        let Some(pb) = progress_clone else {
            // Drain so senders never block
            for _ in receiver.iter() {}
            return;
        };
        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(phase.to_string());
                }
                Event::Load(LoadEvent::Started { total_images }) => {
                    pb.set_length(total_images as u64);
                    pb.set_position(0);
                }
                Event::Load(LoadEvent::ImageLoaded { .. }) => pb.inc(1),
                Event::Matrix(MatrixEvent::Started { total_pairs }) => {
                    pb.set_length(total_pairs as u64);
                    pb.set_position(0);
                }
                Event::Matrix(MatrixEvent::Progress(p)) => {
                    // Rows finish out of order; only move forward
                    if p.pairs_completed as u64 > pb.position() {
                        pb.set_position(p.pairs_completed as u64);
                    }
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Error { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    // Run the pipeline
    let result = pipeline.run_with_events(input_dir, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let result = result?;
    match output {
        OutputFormat::Pretty => print_pretty_results(&term, &result, verbose),
        OutputFormat::Json => print_json_results(&result),
    }

    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    Config::default().write_yaml_file(path, force)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

fn print_pretty_results(term: &Term, result: &RunResult, verbose: bool) {
    let summary = &result.summary;

    term.write_line(&format!("{} Run Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} images processed in {:.1}s",
        style(summary.total_images).cyan(),
        summary.runtime_seconds
    ))
    .ok();
    term.write_line(&format!("  {} kept", style(summary.kept_count).green()))
        .ok();
    term.write_line(&format!(
        "  {} removed ({:.2}%)",
        style(summary.removed_count).yellow(),
        summary.removed_percentage
    ))
    .ok();
    term.write_line("").ok();

    if verbose {
        term.write_line(&format!("{}", style("Images:").bold().underlined()))
            .ok();
        for row in &result.rows {
            let marker = if row.kept {
                style("★").green().to_string()
            } else {
                style("○").dim().to_string()
            };
            term.write_line(&format!(
                "    {} {} {} {}",
                marker,
                row.name,
                style(format!("cluster {}", row.cluster)).dim(),
                style(format!("sharpness {:.1}", row.sharpness)).dim()
            ))
            .ok();
        }
        term.write_line("").ok();
    }

    for (label, path) in [
        ("Kept images:   ", &result.kept_dir),
        ("Removed images:", &result.removed_dir),
        ("Heatmap:       ", &result.heatmap_path),
        ("CSV report:    ", &result.report_csv),
        ("Summary:       ", &result.summary_path),
    ] {
        term.write_line(&format!("  {} {}", style(label).dim(), path.display()))
            .ok();
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style("Originals were copied, not moved. The source directory is untouched.").dim()
    ))
    .ok();
}

fn print_json_results(result: &RunResult) {
    let output = serde_json::json!({
        "summary": result.summary,
        "heatmap_path": result.heatmap_path,
        "kept_dir": result.kept_dir,
        "removed_dir": result.removed_dir,
        "report_csv": result.report_csv,
        "summary_path": result.summary_path,
        "images": result.rows,
    });

    println!("{:#}", output);
}
