//! File enumeration, output naming, and the batch processing loop.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crisp_core::models::{OutputSettings, ProcessingConfig};
use crisp_core::verbose_println;

/// Supported input extensions, matched case-insensitively.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Collect the image files of a directory, sorted for stable ordering.
///
/// A missing or unreadable directory is a warning and an empty list, never
/// an error; the driver reports "nothing to do" instead of aborting.
pub fn collect_image_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            eprintln!("warning: cannot read input directory {}: {}", dir.display(), err);
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();

    files.sort();
    files
}

/// Build the output path: `{output_dir}/{prefix}{stem}.{format extension}`.
pub fn output_path_for(input: &Path, output_dir: &Path, settings: &OutputSettings) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!(
        "{}{}.{}",
        settings.prefix,
        stem,
        settings.format.extension()
    ))
}

/// Process one file end to end: decode, run the pipeline, encode.
///
/// Decode and encode failures fail this file only; filter-stage failures
/// were already absorbed inside the pipeline.
pub fn process_single_image(input: &Path, config: &ProcessingConfig) -> Result<PathBuf, String> {
    let decoded = crisp_core::decoders::decode_image(input).map_err(|e| e.to_string())?;
    verbose_println!(
        "processing {} ({}x{}, {} channel{})",
        input.display(),
        decoded.width(),
        decoded.height(),
        decoded.channels(),
        if decoded.channels() == 1 { "" } else { "s" }
    );

    let processed = crisp_core::pipeline::process_image(decoded, config);

    let output_path = output_path_for(input, &config.paths.output_dir, &config.output);
    crisp_core::encoders::write_image(&processed, &output_path, &config.output)
        .map_err(|e| e.to_string())?;

    Ok(output_path)
}

/// Outcome of a batch run. Counts are truthful even when every file failed.
pub struct BatchReport {
    pub successes: usize,
    pub failures: Vec<(PathBuf, String)>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.successes + self.failures.len()
    }
}

/// Process all files in parallel, reporting progress per file.
///
/// Each image owns its buffer and the config is read-only, so the batch
/// needs no synchronization beyond the progress counter. A failing file is
/// reported and counted; the batch always continues.
pub fn run_batch(files: &[PathBuf], config: &ProcessingConfig) -> BatchReport {
    let started = Instant::now();
    let done = AtomicUsize::new(0);
    let total = files.len();

    let results: Vec<Result<PathBuf, String>> = files
        .par_iter()
        .map(|input| {
            let result = process_single_image(input, config);
            let count = done.fetch_add(1, Ordering::SeqCst) + 1;
            match &result {
                Ok(output) => {
                    println!("[{}/{}] {} -> {}", count, total, input.display(), output.display())
                }
                Err(err) => {
                    eprintln!("[{}/{}] {}: {}", count, total, input.display(), err)
                }
            }
            result
        })
        .collect();

    let mut successes = 0;
    let mut failures = Vec::new();
    for (input, result) in files.iter().zip(results) {
        match result {
            Ok(_) => successes += 1,
            Err(err) => failures.push((input.clone(), err)),
        }
    }

    BatchReport {
        successes,
        failures,
        elapsed: started.elapsed(),
    }
}
