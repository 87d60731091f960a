//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`transform`](crate::transform) stage (which decides
//! which files to touch and where the results go) and the
//! [`backend`](super::backend) (which does the actual pixel work). Keeping the
//! two apart lets tests swap in a mock backend without changing batch logic.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 90). Clamped on construction.
//! - [`ScaleParams`]: uniform scale of one file: source, output, scale factor, aspect factor.
//! - [`CropParams`]: fixed-size center crop of one file.

use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Parameters for a scale operation.
///
/// The output width is `width * scale * aspect_ratio`, the output height is
/// `height * scale`. The batch pipeline always passes `aspect_ratio = 1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub scale: f64,
    pub aspect_ratio: f64,
    pub quality: Quality,
}

/// Parameters for a crop operation (center crop to a fixed size).
#[derive(Debug, Clone, PartialEq)]
pub struct CropParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}
