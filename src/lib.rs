//! # crop-scale
//!
//! Batch-transform a directory (or a list) of PNG/JPEG images: crop to a fixed
//! size, scale by a percentage, or scale automatically so every file fits a
//! byte budget. Results go to an output directory; originals are never touched.
//!
//! # Pipeline
//!
//! ```text
//! 1. Scan        paths/dir  →  image paths       (jpg / jpeg / png only)
//! 2. Inspect     paths      →  ImageRef list     (byte size + header dimensions)
//! 3. Plan        ImageRefs  →  Partition         (shrink / grow / unchanged)
//! 4. Transform   plans      →  output directory  (scale, crop, copy)
//! ```
//!
//! Planning is a pure function, so the interesting decisions are unit and
//! property tested without touching the filesystem or decoding pixels.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Input path resolution and image classification |
//! | [`inspect`] | Byte size and header-only pixel dimensions per file |
//! | [`footprint`] | The footprint planner: partition + ratios |
//! | [`transform`] | Batch scale / crop / copy into the output directory |
//! | [`output_dir`] | Output directory resolution, cached per invocation |
//! | [`commands`] | Per-command wiring of the stages |
//! | [`config`] | `crop-scale.toml` loading and the per-run [`config::RunConfig`] |
//! | [`imaging`] | Backend trait, `image`-crate backend, dimension math |
//! | [`output`] | Console report formatting |
//! | [`types`] | Shared stage types (`ImageRef`, `ScalePlan`, `CropSize`) |
//!
//! # Design Decisions
//!
//! ## Fail-fast batches
//!
//! Every stage stops at the first failing file. A half-written output
//! directory with an unpredictable subset of files is harder to reason about
//! than an error naming the file that broke the run.
//!
//! ## Linear footprint model
//!
//! A file of `size` bytes over a `limit` is scaled by `limit / size`. Encoded
//! size really follows pixel area, so results typically land below the limit.
//! See [`footprint`] for details.
//!
//! ## Explicit run state
//!
//! Verbosity, encoding quality, worker count and the output directory live in
//! [`config::RunConfig`] and [`output_dir::OutputResolver`], which are built
//! once per invocation and handed to each stage. There is no global mutable state.

pub mod commands;
pub mod config;
pub mod footprint;
pub mod imaging;
pub mod inspect;
pub mod output;
pub mod output_dir;
pub mod scan;
pub mod transform;
pub mod types;
