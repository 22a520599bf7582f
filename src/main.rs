//! # frame-sieve CLI
//!
//! Command-line interface for the near-duplicate frame remover.
//!
//! ## Usage
//! ```bash
//! frame-sieve run ./scans/site_a --output-root ./outputs
//! frame-sieve run ./scans/site_a --config sieve.yaml --output json
//! frame-sieve init-config sieve.yaml
//! ```

mod cli;

use frame_sieve::Result;

fn main() -> Result<()> {
    cli::run()
}
