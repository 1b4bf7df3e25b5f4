//! Configuration loading and the global verbose flag.
//!
//! A config file is searched for in several locations; a malformed or
//! missing file falls back to the built-in defaults with a warning rather
//! than aborting, so a bad config never stops a batch from running.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::models::ProcessingConfig;

// Global verbose flag for controlling per-stage output
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set the global verbose flag. When true, per-stage messages are printed.
pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::SeqCst);
}

/// Check if verbose mode is enabled.
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Print a message to stderr only if verbose mode is enabled.
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if $crate::config::is_verbose() {
            eprintln!($($arg)*);
        }
    };
}

/// Canonical list of candidate config file names we search for on disk.
const CONFIG_FILENAMES: &[&str] = &["crisp.yml", "crisp.yaml", "config.yml", "config.yaml"];

/// Loaded configuration together with its source path and any warnings
/// collected while searching and parsing.
pub struct ConfigHandle {
    pub config: ProcessingConfig,
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

impl ConfigHandle {
    fn with_config(
        config: ProcessingConfig,
        source: Option<PathBuf>,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            config,
            source,
            warnings,
        }
    }
}

/// Load configuration from disk, optionally forcing a specific path.
///
/// Candidates are tried in order; the first file that exists and parses
/// wins. Files that fail to read or parse add a warning and the search
/// continues, ending at the built-in defaults.
pub fn load_config(custom_path: Option<&Path>) -> ConfigHandle {
    let mut warnings = Vec::new();
    let candidates = get_config_candidates(custom_path);

    for candidate in candidates {
        if !candidate.exists() || !candidate.is_file() {
            continue;
        }

        match fs::read_to_string(&candidate) {
            Ok(contents) => match serde_yaml::from_str::<ProcessingConfig>(&contents) {
                Ok(config) => {
                    let source = fs::canonicalize(&candidate).unwrap_or(candidate);
                    return ConfigHandle::with_config(config.sanitize(), Some(source), warnings);
                }
                Err(err) => warnings.push(format!(
                    "Failed to parse config {}: {}",
                    candidate.display(),
                    err
                )),
            },
            Err(err) => warnings.push(format!(
                "Failed to read config {}: {}",
                candidate.display(),
                err
            )),
        }
    }

    warnings.push("No config file found; using built-in defaults.".to_string());
    ConfigHandle::with_config(ProcessingConfig::default(), None, warnings)
}

/// Get list of config file candidates to try
fn get_config_candidates(custom_path: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = custom_path {
        candidates.push(path.to_path_buf());
    }

    if let Ok(env_path) = std::env::var("CRISP_CONFIG") {
        candidates.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        for name in CONFIG_FILENAMES {
            candidates.push(cwd.join("config").join(name));
            candidates.push(cwd.join(name));
        }
    }

    if let Some(home_dir) = dirs::home_dir() {
        for name in CONFIG_FILENAMES {
            candidates.push(home_dir.join("crisp").join(name));
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DenoiseMode;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_explicit_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("crisp.yml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "denoise:\n  mode: median").unwrap();

        let handle = load_config(Some(&path));
        assert_eq!(handle.config.denoise.mode, DenoiseMode::Median);
        assert!(handle.source.is_some());
        assert!(handle.warnings.is_empty());
    }

    #[test]
    fn test_malformed_config_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("crisp.yml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "denoise: [not, a, mapping").unwrap();

        let handle = load_config(Some(&path));
        // Defaults, with a warning describing the parse failure
        assert_eq!(handle.config.denoise.mode, DenoiseMode::Bilateral);
        assert!(handle
            .warnings
            .iter()
            .any(|w| w.contains("Failed to parse config")));
    }

    #[test]
    fn test_loaded_config_is_sanitized() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("crisp.yml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "denoise:\n  median:\n    kernel_size: 6").unwrap();

        let handle = load_config(Some(&path));
        assert_eq!(handle.config.denoise.median.kernel_size, 7);
    }
}
