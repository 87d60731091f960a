//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` (header only) |
//! | **Scale** | Lanczos3 resample, uniform ratio |
//! | **Crop** | centered fixed-size window |
//! | **Encode** | PNG or JPEG, chosen by output file name |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, Resampled};
pub use calculations::{
    CropRect, MAX_OUTPUT_PIXELS, calculate_crop_rect, calculate_scaled_dimensions,
};
pub use params::{CropParams, Quality, ScaleParams};
pub use rust_backend::RustBackend;
