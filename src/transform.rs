//! Batch transformation: apply crops and scales, copy untouched files.
//!
//! Every result is written to `<output_dir>/<basename of source>`, replacing
//! any file of the same name. Scaling is always uniform (`aspect_ratio = 1`).
//! A scale or crop whose output would land on its own source is refused
//! before any file is written, so originals are never replaced.
//!
//! ## Failure policy
//!
//! Each batch call is fail-fast: the first backend or write error stops the
//! batch and is returned. Files are independent and go to distinct basenames,
//! so work is spread over the rayon pool; outputs finished before the failure
//! stay on disk.
//!
//! ## Progress
//!
//! When an event sender is supplied, one [`TransformEvent`] is sent per
//! finished file. The binary prints them from a dedicated thread via
//! [`output::format_transform_event`](crate::output::format_transform_event).

use crate::imaging::{BackendError, CropParams, ImageBackend, Quality, Resampled, ScaleParams};
use crate::types::{CropSize, ScalePlan};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Image processing failed: {0}")]
    Backend(#[from] BackendError),
    #[error("Source has no file name: {0}")]
    NoFileName(PathBuf),
    #[error("Refusing to overwrite original {0}: choose an output directory other than the input directory")]
    InPlace(PathBuf),
    #[error("Could not copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-file progress, emitted once the output is written.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformEvent {
    Scaled {
        source: PathBuf,
        output: PathBuf,
        ratio: f64,
        resampled: Resampled,
    },
    Cropped {
        source: PathBuf,
        output: PathBuf,
        resampled: Resampled,
    },
    Copied {
        source: PathBuf,
        output: PathBuf,
    },
}

/// `<output_dir>/<basename of source>`.
pub fn output_path(source: &Path, output_dir: &Path) -> Result<PathBuf, TransformError> {
    source
        .file_name()
        .map(|name| output_dir.join(name))
        .ok_or_else(|| TransformError::NoFileName(source.to_path_buf()))
}

/// Fail if any source would be written over itself.
fn check_not_in_place<'a>(
    sources: impl IntoIterator<Item = &'a Path>,
    output_dir: &Path,
) -> Result<(), TransformError> {
    let output_dir = std::path::absolute(output_dir).unwrap_or_else(|_| output_dir.to_path_buf());
    for source in sources {
        let source = std::path::absolute(source).unwrap_or_else(|_| source.to_path_buf());
        if output_path(&source, &output_dir)? == source {
            return Err(TransformError::InPlace(source));
        }
    }
    Ok(())
}

fn emit(events: Option<&Sender<TransformEvent>>, event: TransformEvent) {
    if let Some(tx) = events {
        // The printer may have gone away; progress is best-effort.
        tx.send(event).ok();
    }
}

/// Scale every planned file by its ratio.
pub fn scale_files(
    backend: &impl ImageBackend,
    plans: &[ScalePlan],
    output_dir: &Path,
    quality: Quality,
    events: Option<&Sender<TransformEvent>>,
) -> Result<(), TransformError> {
    check_not_in_place(plans.iter().map(|plan| plan.path.as_path()), output_dir)?;
    plans.par_iter().try_for_each(|plan| {
        let output = output_path(&plan.path, output_dir)?;
        let resampled = backend.scale(&ScaleParams {
            source: plan.path.clone(),
            output: output.clone(),
            scale: plan.ratio,
            aspect_ratio: 1.0,
            quality,
        })?;
        tracing::debug!(source = %plan.path.display(), ratio = plan.ratio, "scaled");
        emit(
            events,
            TransformEvent::Scaled {
                source: plan.path.clone(),
                output,
                ratio: plan.ratio,
                resampled,
            },
        );
        Ok(())
    })
}

/// Center-crop every file to `size`.
pub fn crop_files(
    backend: &impl ImageBackend,
    paths: &[PathBuf],
    size: CropSize,
    output_dir: &Path,
    quality: Quality,
    events: Option<&Sender<TransformEvent>>,
) -> Result<(), TransformError> {
    check_not_in_place(paths.iter().map(PathBuf::as_path), output_dir)?;
    paths.par_iter().try_for_each(|path| {
        let output = output_path(path, output_dir)?;
        let resampled = backend.crop(&CropParams {
            source: path.clone(),
            output: output.clone(),
            width: size.width,
            height: size.height,
            quality,
        })?;
        tracing::debug!(source = %path.display(), "cropped");
        emit(
            events,
            TransformEvent::Cropped {
                source: path.clone(),
                output,
                resampled,
            },
        );
        Ok(())
    })
}

/// Copy files byte-for-byte into the output directory.
pub fn copy_unchanged(
    paths: &[PathBuf],
    output_dir: &Path,
    events: Option<&Sender<TransformEvent>>,
) -> Result<(), TransformError> {
    paths.par_iter().try_for_each(|path| {
        let output = output_path(path, output_dir)?;
        if output != *path {
            std::fs::copy(path, &output).map_err(|source| TransformError::Copy {
                from: path.clone(),
                to: output.clone(),
                source,
            })?;
        }
        emit(
            events,
            TransformEvent::Copied {
                source: path.clone(),
                output,
            },
        );
        Ok(())
    })
}
