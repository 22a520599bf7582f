//! # Frame Sieve
//!
//! Removes near-duplicate frames from photogrammetry image sets.
//!
//! Every pair of images is scored with a weighted mix of perceptual hash,
//! difference hash and structural similarity. The distance matrix is
//! clustered, and each cluster keeps only its sharpest frame. Frames that
//! resemble nothing else are always kept.
//!
//! ## Architecture
//! - `core` - The detection and selection engine
//! - `config` - YAML run configuration
//! - `events` - Event-driven progress reporting
//! - `error` - Error types per stage

pub mod config;
pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use config::Config;
pub use error::{FrameSieveError, Result};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the application.
///
/// `RUST_LOG` wins when set; otherwise warnings only, or everything down to
/// `debug` when `verbose`. Logs go to stderr so stdout stays parseable.
/// Calling it twice is harmless.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
