//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` (header only) |
//! | Decode (JPEG, PNG) | `image::ImageReader` |
//! | Scale | `image::imageops::resize` with `Lanczos3` filter |
//! | Crop | `DynamicImage::crop_imm` on a centered window |
//! | Encode | `PngEncoder` for `*png` basenames, `JpegEncoder` otherwise |

use super::backend::{BackendError, Dimensions, ImageBackend, Resampled};
use super::calculations::{MAX_OUTPUT_PIXELS, calculate_crop_rect, calculate_scaled_dimensions};
use super::params::{CropParams, Quality, ScaleParams};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::io::BufWriter;
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(|source| BackendError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .with_guessed_format()
        .map_err(|source| BackendError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .decode()
        .map_err(|e| BackendError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

fn dimensions_of(img: &DynamicImage) -> Dimensions {
    let (width, height) = img.dimensions();
    Dimensions { width, height }
}

/// Encode and write an image, choosing PNG when the file name ends in `png`
/// and JPEG otherwise.
fn save_image(img: &DynamicImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
    let is_png = path
        .file_name()
        .map(|n| n.to_string_lossy().ends_with("png"))
        .unwrap_or(false);

    let file = std::fs::File::create(path).map_err(|source| BackendError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    let writer = BufWriter::new(file);

    let encoded = if is_png {
        img.write_with_encoder(PngEncoder::new(writer))
    } else {
        // JPEG has no alpha channel
        DynamicImage::ImageRgb8(img.to_rgb8())
            .write_with_encoder(JpegEncoder::new_with_quality(writer, quality.value()))
    };

    encoded.map_err(|e| BackendError::Encode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| BackendError::Decode {
            path: path.to_path_buf(),
            message: format!("failed to read dimensions: {e}"),
        })?;
        Ok(Dimensions { width, height })
    }

    fn scale(&self, params: &ScaleParams) -> Result<Resampled, BackendError> {
        let source = self.identify(&params.source)?;
        let (width, height) = calculate_scaled_dimensions(
            (source.width, source.height),
            params.scale,
            params.aspect_ratio,
        )
        .ok_or_else(|| BackendError::TooLarge {
            path: params.source.clone(),
            dimensions: source,
            scale: params.scale,
            max_pixels: MAX_OUTPUT_PIXELS,
        })?;
        let img = load_image(&params.source)?;
        let source = dimensions_of(&img);
        let scaled = img.resize_exact(width, height, FilterType::Lanczos3);
        save_image(&scaled, &params.output, params.quality)?;
        Ok(Resampled {
            source,
            result: dimensions_of(&scaled),
        })
    }

    fn crop(&self, params: &CropParams) -> Result<Resampled, BackendError> {
        let img = load_image(&params.source)?;
        let source = dimensions_of(&img);
        let rect = calculate_crop_rect((source.width, source.height), (params.width, params.height));
        let cropped = img.crop_imm(rect.x, rect.y, rect.width, rect.height);
        save_image(&cropped, &params.output, params.quality)?;
        Ok(Resampled {
            source,
            result: dimensions_of(&cropped),
        })
    }
}
