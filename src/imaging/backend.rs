//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations the pipeline needs:
//! identify (header-only dimension read), scale and crop. Scale and crop read
//! the source, resample, and encode the result to the output path in one call.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording mock in [`tests`].

use super::params::{CropParams, ScaleParams};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("Scaling {path} ({dimensions}) by {scale} exceeds the {max_pixels}-pixel output limit")]
    TooLarge {
        path: PathBuf,
        dimensions: Dimensions,
        scale: f64,
        max_pixels: u64,
    },
    #[error("Could not encode {path}: {message}")]
    Encode { path: PathBuf, message: String },
    #[error("Could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Before/after dimensions of a single scale or crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resampled {
    pub source: Dimensions,
    pub result: Dimensions,
}

/// Trait for image processing backends.
///
/// `Sync` so a single backend can be shared across rayon workers.
pub trait ImageBackend: Sync {
    /// Read pixel dimensions from the image header, without decoding pixels.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Scale the source uniformly and write it to `params.output`.
    fn scale(&self, params: &ScaleParams) -> Result<Resampled, BackendError>;

    /// Center-crop the source to a fixed size and write it to `params.output`.
    fn crop(&self, params: &CropParams) -> Result<Resampled, BackendError>;
}
