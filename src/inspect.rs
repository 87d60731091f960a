//! Size inspection: byte size and pixel dimensions per file.
//!
//! Byte size comes from filesystem metadata; dimensions come from the image
//! header via [`ImageBackend::identify`], so no pixels are decoded here.
//!
//! Inspection is fail-fast: the first file whose size or dimensions cannot be
//! read aborts the batch. Files are independent, so the work runs on the rayon
//! pool; the returned list keeps input order.

use crate::imaging::{BackendError, ImageBackend};
use crate::types::ImageRef;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InspectError {
    #[error("Could not stat {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not read image dimensions of {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

/// Inspect a single file.
pub fn inspect_one(backend: &impl ImageBackend, path: &Path) -> Result<ImageRef, InspectError> {
    let byte_size = std::fs::metadata(path)
        .map_err(|source| InspectError::Metadata {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    let dims = backend
        .identify(path)
        .map_err(|source| InspectError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(ImageRef {
        path: path.to_path_buf(),
        byte_size,
        width: dims.width,
        height: dims.height,
    })
}

/// Inspect every path, stopping at the first failure.
pub fn inspect(
    backend: &impl ImageBackend,
    paths: &[PathBuf],
) -> Result<Vec<ImageRef>, InspectError> {
    let images: Vec<ImageRef> = paths
        .par_iter()
        .map(|path| inspect_one(backend, path))
        .collect::<Result<_, _>>()?;
    tracing::debug!(count = images.len(), "inspected images");
    Ok(images)
}
