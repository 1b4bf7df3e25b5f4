use clap::Parser;
use std::path::PathBuf;

use crisp_cli::{
    collect_image_files, parse_denoise_mode, parse_output_format, parse_sharpen_mode, run_batch,
    BatchReport,
};
use crisp_core::config::{load_config, set_verbose};
use crisp_core::models::ProcessingConfig;
use crisp_core::verbose_println;

#[derive(Parser)]
#[command(name = "crisp")]
#[command(version, about = "Batch image denoising and sharpening", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Input directory (overrides config)
    #[arg(short, long, value_name = "DIR")]
    input: Option<PathBuf>,

    /// Output directory (overrides config)
    #[arg(short, long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Denoise mode: gaussian, mean, median, bilateral, nlmeans
    #[arg(long, value_name = "MODE")]
    denoise: Option<String>,

    /// Sharpen mode: laplacian, unsharp_mask, custom, adaptive
    #[arg(long, value_name = "MODE")]
    sharpen: Option<String>,

    /// Disable the sharpening stage
    #[arg(long)]
    no_sharpen: bool,

    /// Output format: png, jpg, webp, bmp, tiff
    #[arg(short, long, value_name = "FORMAT")]
    format: Option<String>,

    /// Output quality, 0-100 (meaning depends on format)
    #[arg(long, value_name = "N")]
    quality: Option<u8>,

    /// Number of parallel threads
    #[arg(short = 'j', long, value_name = "N")]
    threads: Option<usize>,

    /// Per-stage progress output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress the config summary and per-stage output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let handle = load_config(cli.config.as_deref());
    let mut config = handle.config;

    // CLI overrides beat the config file
    if let Some(input) = cli.input {
        config.paths.input_dir = input;
    }
    if let Some(out) = cli.out {
        config.paths.output_dir = out;
    }
    if let Some(mode) = cli.denoise.as_deref() {
        config.denoise.mode = parse_denoise_mode(mode)?;
    }
    if let Some(mode) = cli.sharpen.as_deref() {
        config.sharpen.mode = parse_sharpen_mode(mode)?;
    }
    if cli.no_sharpen {
        config.sharpen.enabled = false;
    }
    if let Some(format) = cli.format.as_deref() {
        config.output.format = parse_output_format(format)?;
    }
    if let Some(quality) = cli.quality {
        config.output.quality = quality.min(100);
    }
    if cli.quiet {
        config.verbose = false;
    } else if cli.verbose {
        config.verbose = true;
    }
    set_verbose(config.verbose);

    for warning in &handle.warnings {
        eprintln!("warning: {}", warning);
    }
    if let Some(source) = &handle.source {
        verbose_println!("Loaded config from {}", source.display());
    }

    if let Some(num_threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .map_err(|e| format!("Failed to configure thread pool: {}", e))?;
        println!("Using {} threads for parallel processing", num_threads);
    }

    if config.verbose {
        print_config_summary(&config);
    }

    std::fs::create_dir_all(&config.paths.output_dir).map_err(|e| {
        format!(
            "Failed to create output directory {}: {}",
            config.paths.output_dir.display(),
            e
        )
    })?;

    let files = collect_image_files(&config.paths.input_dir);
    if files.is_empty() {
        println!(
            "No image files found in {}",
            config.paths.input_dir.display()
        );
        println!("Supported formats: .jpg, .jpeg, .png, .bmp, .tiff, .tif, .webp");
        return Ok(());
    }

    println!("Processing {} files...\n", files.len());
    let report = run_batch(&files, &config);
    print_summary(&report, &config);

    Ok(())
}

fn print_config_summary(config: &ProcessingConfig) {
    println!("========================================");
    println!("PROCESSING CONFIGURATION");
    println!("========================================");
    println!("  Input dir:   {}", config.paths.input_dir.display());
    println!("  Output dir:  {}", config.paths.output_dir.display());
    println!("  Denoise:     {}", config.denoise.mode.label());
    if config.sharpen.enabled {
        println!("  Sharpen:     {}", config.sharpen.mode.label());
    } else {
        println!("  Sharpen:     disabled");
    }
    println!(
        "  Output:      {} (quality {})",
        config.output.format.extension(),
        config.output.quality
    );
    if config.resize.enabled {
        println!(
            "  Resize:      max {}x{}{}",
            config.resize.max_width,
            config.resize.max_height,
            if config.resize.preserve_aspect_ratio {
                ", preserve aspect"
            } else {
                ""
            }
        );
    }
    println!();
}

fn print_summary(report: &BatchReport, config: &ProcessingConfig) {
    println!("\n========================================");
    println!("BATCH PROCESSING COMPLETE");
    println!("========================================");
    println!("  Successful: {}", report.successes);
    println!("  Failed:     {}", report.failures.len());
    println!("  Elapsed:    {:.2}s", report.elapsed.as_secs_f64());
    if report.successes > 0 {
        println!(
            "  Average:    {:.2}s per image",
            report.elapsed.as_secs_f64() / report.successes as f64
        );
    }
    println!("  Output dir: {}", config.paths.output_dir.display());
    println!("  Denoise mode:  {}", config.denoise.mode.label());
    if config.sharpen.enabled {
        println!("  Sharpen mode:  {}", config.sharpen.mode.label());
    } else {
        println!("  Sharpen:       disabled");
    }
    println!("  Output format: {}", config.output.format.extension());

    if !report.failures.is_empty() {
        println!("\nFailures:");
        for (path, error) in &report.failures {
            println!("  {}: {}", path.display(), error);
        }
    }
}
