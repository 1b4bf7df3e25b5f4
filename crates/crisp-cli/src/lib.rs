//! Shared utilities for the crisp CLI.
//!
//! Split out of `main.rs` so argument parsing helpers and the batch
//! processing loop can be unit tested.

pub mod parsers;
pub mod processing;

// Re-export commonly used items at the crate root for convenience
pub use parsers::{parse_denoise_mode, parse_output_format, parse_sharpen_mode};
pub use processing::{
    collect_image_files, output_path_for, process_single_image, run_batch, BatchReport,
    SUPPORTED_EXTENSIONS,
};
