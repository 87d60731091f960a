//! Output directory resolution.
//!
//! Every command writes into a single directory per invocation:
//!
//! - an explicit `--output-directory` is used as given and is never
//!   created, or
//! - `<backup>/<Label>Output` is derived from the input directory (or the
//!   working directory for path lists) and created if missing.
//!
//! The first successful resolution is cached; later calls return the same
//! path without touching the filesystem again. Resolution takes `&mut self`,
//! so it always completes before any worker thread starts writing.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputDirError {
    #[error("No output directory: pass --output-directory or at least one input to infer it from")]
    NoDirectory,
    #[error("Could not create output directory {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Label used for crop output directories (`CropOutput`).
pub const CROP_LABEL: &str = "Crop";
/// Label used for scale output directories (`ScaleOutput`).
pub const SCALE_LABEL: &str = "Scale";

/// Resolves and caches the output directory for one command invocation.
#[derive(Debug, Default)]
pub struct OutputResolver {
    explicit: Option<PathBuf>,
    resolved: Option<PathBuf>,
}

impl OutputResolver {
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self {
            explicit,
            resolved: None,
        }
    }

    /// Resolve the output directory, creating `<backup>/<label>Output` when no
    /// explicit directory was given.
    pub fn resolve(&mut self, backup: Option<&Path>, label: &str) -> Result<&Path, OutputDirError> {
        if self.resolved.is_none() {
            let dir = match (&self.explicit, backup) {
                (Some(explicit), _) => explicit.clone(),
                (None, Some(backup)) => {
                    let dir = backup.join(format!("{label}Output"));
                    std::fs::create_dir_all(&dir).map_err(|source| OutputDirError::Create {
                        path: dir.clone(),
                        source,
                    })?;
                    tracing::debug!(dir = %dir.display(), "created output directory");
                    dir
                }
                (None, None) => return Err(OutputDirError::NoDirectory),
            };
            self.resolved = Some(dir);
        }
        self.resolved.as_deref().ok_or(OutputDirError::NoDirectory)
    }
}
