//! Shared types passed between pipeline stages.
//!
//! These types are created by one stage and read by the next
//! (inspect → footprint → transform). They are snapshots: nothing
//! re-validates them against the filesystem after they are built.

use serde::Serialize;
use std::path::PathBuf;

/// One on-disk image as seen at inspection time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    /// Normalized absolute path (the identity key used by the planner).
    pub path: PathBuf,
    /// File size in bytes, from filesystem metadata.
    pub byte_size: u64,
    pub width: u32,
    pub height: u32,
}

/// A file paired with the uniform scale ratio to apply to it.
///
/// `ratio < 1` shrinks, `ratio > 1` grows, `ratio == 1` is a no-op scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalePlan {
    pub path: PathBuf,
    pub ratio: f64,
}

impl ScalePlan {
    pub fn new(path: impl Into<PathBuf>, ratio: f64) -> Self {
        Self {
            path: path.into(),
            ratio,
        }
    }
}

/// Fixed target size for a crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropSize {
    pub width: u32,
    pub height: u32,
}
