//! # Events Module
//!
//! Progress reporting for long runs.
//!
//! The pipeline emits events through a channel so any front-end (the CLI
//! progress bar, a GUI, a log sink) can follow a run without the core
//! knowing about it.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Matrix(MatrixEvent::Progress(p)) = event {
//!             println!("{}/{} pairs", p.pairs_completed, p.total_pairs);
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&input_dir, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
