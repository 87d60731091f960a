//! Tool configuration.
//!
//! Settings come from an optional `crop-scale.toml`, looked up in the working
//! directory unless `--config` points somewhere else. Command-line flags win
//! over file values. The merged result is a [`RunConfig`], built once in
//! `main` and passed by reference to every stage.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! verbose = false           # Print before/after dimensions for every file
//!
//! [encoding]
//! jpeg_quality = 90         # JPEG quality for scaled/cropped output (1-100)
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::Quality;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory when `--config` is absent.
pub const CONFIG_FILENAME: &str = "crop-scale.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Contents of `crop-scale.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Default for `--verbose`.
    pub verbose: bool,
    /// Output encoding settings.
    pub encoding: EncodingConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl ToolConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.encoding.jpeg_quality) {
            return Err(ConfigError::Validation(
                "encoding.jpeg_quality must be 1-100".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Output encoding settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingConfig {
    /// JPEG quality for every non-PNG output.
    pub jpeg_quality: u32,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self { jpeg_quality: 90 }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Load the tool config.
///
/// An explicit path must exist. Without one, `crop-scale.toml` in `cwd` is
/// used if present, and stock defaults otherwise.
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<ToolConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = cwd.join(CONFIG_FILENAME);
            if !candidate.exists() {
                return Ok(ToolConfig::default());
            }
            candidate
        }
    };
    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let config: ToolConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Effective settings for one invocation: file config merged with CLI flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub verbose: bool,
    pub quality: Quality,
    pub threads: usize,
}

impl RunConfig {
    pub fn new(config: &ToolConfig, verbose_flag: bool) -> Self {
        Self {
            verbose: verbose_flag || config.verbose,
            quality: Quality::new(config.encoding.jpeg_quality),
            threads: effective_threads(&config.processing),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new(&ToolConfig::default(), false)
    }
}

/// Returns a fully-commented stock `crop-scale.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# crop-scale configuration
# ========================
# All settings are optional. Values shown below are the defaults.
# The file is read from ./crop-scale.toml, or from the path given to --config.
# Unknown keys will cause an error.

# Print source and result dimensions for every transformed file.
# The --verbose flag turns this on regardless of the value here.
verbose = false

# ---------------------------------------------------------------------------
# Encoding
# ---------------------------------------------------------------------------
[encoding]
# JPEG quality (1 = smallest, 100 = best) for every output that is not a PNG.
jpeg_quality = 90

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
