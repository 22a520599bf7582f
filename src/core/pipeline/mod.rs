//! # Pipeline Module
//!
//! Orchestrates a full run.
//!
//! ## Pipeline Stages
//! 1. **Load** - decode and downscale every image, sorted by file name
//! 2. **Measure** - hash each image once, fill the pairwise distance matrix
//! 3. **Cluster** - group images from the matrix
//! 4. **Select** - keep the sharpest image of each group and every outlier
//! 5. **Write** - copy kept and removed originals into their directories
//! 6. **Report** - heatmap, CSV report and JSON summary
//!
//! Each stage is a plain function in [`stages`], so it can be driven and
//! tested on its own. Output directories are only created once every
//! in-memory stage has succeeded.
//!
//! ## Parallelism
//! Uses rayon for hashing, sharpness scoring and the pair loop.

mod executor;
pub mod stages;

pub use executor::{Pipeline, PipelineBuilder, RunResult};
