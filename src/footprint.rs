//! Footprint planning: decide which images shrink, which grow, and by how much.
//!
//! This is the decision core of the `reduce-memory-footprint` command. It is a
//! pure function of its inputs, so it is tested
//! directly on synthetic [`ImageRef`]s.
//!
//! ## Algorithm
//!
//! ```text
//! images ──┬── byte_size >= byte_limit ──► shrink  (ratio = limit / size)
//!          │
//!          └── byte_size <  byte_limit ──► ok ──┬── w < min || h < min ──► grow
//!                                               │      (ratio = min / w, or min / h)
//!                                               └── otherwise ───────────► unchanged
//! ```
//!
//! The grow pass only runs when a minimum side is configured. When both sides
//! are below the minimum, the width-derived ratio wins.
//!
//! ## Linear approximation
//!
//! The shrink ratio assumes encoded byte size scales linearly with the linear
//! scale factor. Encoded size actually tracks pixel area (the square of the
//! ratio) for most codecs, so shrunk files usually land well under the limit.
//! The ratio is kept linear because it determines the observable output size.

use crate::types::{ImageRef, ScalePlan};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum PlanError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Bytes per megabyte for the `--limit-mb` style options.
pub const MEGABYTE: u64 = 1_000_000;

/// Planner thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Files at or above this many bytes shrink. Must be non-zero.
    pub byte_limit: u64,
    /// When set, files with either side below this many pixels grow.
    pub minimum_side: Option<u32>,
}

impl Thresholds {
    pub fn from_megabytes(limit_mb: u64, minimum_side: Option<u32>) -> Self {
        Self {
            byte_limit: limit_mb.saturating_mul(MEGABYTE),
            minimum_side,
        }
    }
}

/// Planner output. Every input image lands in exactly one collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Partition {
    pub shrink: Vec<ScalePlan>,
    pub grow: Vec<ScalePlan>,
    pub unchanged: Vec<PathBuf>,
}

impl Partition {
    /// Number of images that are not shrunk (grow + unchanged).
    pub fn ok_for_memory(&self) -> usize {
        self.grow.len() + self.unchanged.len()
    }
}

/// Ratio that brings `byte_size` down to `byte_limit` under the linear model.
pub fn shrink_ratio(byte_limit: u64, byte_size: u64) -> Result<f64, PlanError> {
    if byte_size == 0 {
        return Err(PlanError::InvalidInput(
            "cannot compute a shrink ratio for a zero-byte file".into(),
        ));
    }
    Ok(byte_limit as f64 / byte_size as f64)
}

/// Ratio that brings the short offending side up to `minimum_side`.
///
/// Width is checked first: if it is below the minimum it governs the ratio,
/// even when the height is also below.
pub fn grow_ratio(width: u32, height: u32, minimum_side: u32) -> Result<f64, PlanError> {
    let governing = if width < minimum_side { width } else { height };
    if governing == 0 {
        return Err(PlanError::InvalidInput(format!(
            "cannot compute a grow ratio for a {width}x{height} image"
        )));
    }
    Ok(minimum_side as f64 / governing as f64)
}

/// Split images into those at or above `byte_limit` and those below it.
pub fn files_above(images: &[ImageRef], byte_limit: u64) -> (Vec<&ImageRef>, Vec<&ImageRef>) {
    images.iter().partition(|image| image.byte_size >= byte_limit)
}

/// A zero byte limit would put every file over it.
pub fn check_byte_limit(byte_limit: u64) -> Result<(), PlanError> {
    if byte_limit == 0 {
        return Err(PlanError::InvalidInput("byte limit must be greater than zero".into()));
    }
    Ok(())
}

/// Partition `images` into shrink / grow / unchanged with per-file ratios.
pub fn plan(images: &[ImageRef], thresholds: Thresholds) -> Result<Partition, PlanError> {
    check_byte_limit(thresholds.byte_limit)?;

    let (shrink_candidates, ok_candidates) = files_above(images, thresholds.byte_limit);

    let shrink = shrink_candidates
        .iter()
        .map(|image| {
            shrink_ratio(thresholds.byte_limit, image.byte_size)
                .map(|ratio| ScalePlan::new(&image.path, ratio))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let Some(minimum_side) = thresholds.minimum_side else {
        return Ok(Partition {
            shrink,
            grow: Vec::new(),
            unchanged: ok_candidates.iter().map(|i| i.path.clone()).collect(),
        });
    };

    let grow_candidates: Vec<&ImageRef> = ok_candidates
        .iter()
        .copied()
        .filter(|image| image.width < minimum_side || image.height < minimum_side)
        .collect();

    let grow = grow_candidates
        .iter()
        .map(|image| {
            grow_ratio(image.width, image.height, minimum_side)
                .map(|ratio| ScalePlan::new(&image.path, ratio))
        })
        .collect::<Result<Vec<_>, _>>()?;

    // unchanged = ok − grow, keyed on path
    let growing: HashSet<&Path> = grow_candidates.iter().map(|i| i.path.as_path()).collect();
    let unchanged = ok_candidates
        .iter()
        .filter(|image| !growing.contains(image.path.as_path()))
        .map(|image| image.path.clone())
        .collect();

    tracing::debug!(
        shrink = shrink.len(),
        grow = grow.len(),
        "planned footprint partition"
    );

    Ok(Partition {
        shrink,
        grow,
        unchanged,
    })
}
