//! End-to-end runs of the command pipelines against real image files.
//!
//! Images are synthesized with the `image` crate into a temp directory and
//! processed with the `image`-crate backend, so these tests exercise decoding,
//! resampling and encoding together with the planning logic.

use crop_scale::commands::{Input, Pipeline};
use crop_scale::config::RunConfig;
use crop_scale::footprint::Thresholds;
use crop_scale::imaging::{RustBackend, calculate_scaled_dimensions};
use crop_scale::output_dir::OutputResolver;
use crop_scale::transform::TransformEvent;
use crop_scale::types::CropSize;
use image::{ImageBuffer, Rgb, RgbImage};
use std::path::Path;
use std::sync::mpsc;
use tempfile::TempDir;

/// PNG full of pseudo-random pixels, so it compresses poorly.
fn noisy_png(path: &Path, width: u32, height: u32) {
    let mut state: u32 = 0x2545_f491;
    let img: RgbImage = ImageBuffer::from_fn(width, height, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let [r, g, b, _] = state.to_le_bytes();
        Rgb([r, g, b])
    });
    img.save(path).unwrap();
}

fn solid_png(path: &Path, width: u32, height: u32) {
    let img: RgbImage = ImageBuffer::from_pixel(width, height, Rgb([40, 120, 200]));
    img.save(path).unwrap();
}

fn solid_jpeg(path: &Path, width: u32, height: u32) {
    let img: RgbImage = ImageBuffer::from_pixel(width, height, Rgb([200, 80, 20]));
    img.save(path).unwrap();
}

fn size_of(path: &Path) -> u64 {
    std::fs::metadata(path).unwrap().len()
}

fn dims(path: &Path) -> (u32, u32) {
    image::image_dimensions(path).unwrap()
}

#[test]
fn reduce_footprint_shrinks_grows_and_copies() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    noisy_png(&dir.join("big.png"), 400, 300);
    solid_png(&dir.join("small.png"), 40, 30);
    solid_jpeg(&dir.join("mid.jpg"), 200, 200);
    std::fs::write(dir.join("notes.txt"), "not an image").unwrap();

    let big_size = size_of(&dir.join("big.png"));
    let byte_limit = big_size / 2;
    assert!(size_of(&dir.join("mid.jpg")) < byte_limit);
    assert!(size_of(&dir.join("small.png")) < byte_limit);

    let backend = RustBackend::new();
    let pipeline = Pipeline::new(&backend, dir, RunConfig::default());
    let thresholds = Thresholds {
        byte_limit,
        minimum_side: Some(100),
    };

    let partition = pipeline.plan_footprint(dir, thresholds).unwrap();
    assert_eq!(partition.shrink.len(), 1);
    assert!(partition.shrink[0].path.ends_with("big.png"));
    assert_eq!(partition.grow.len(), 1);
    assert!(partition.grow[0].path.ends_with("small.png"));
    assert_eq!(partition.grow[0].ratio, 2.5);
    assert_eq!(partition.unchanged.len(), 1);
    assert!(partition.unchanged[0].ends_with("mid.jpg"));

    let mut resolver = OutputResolver::new(None);
    let out = pipeline
        .apply_footprint(&partition, dir, &mut resolver)
        .unwrap();
    assert_eq!(out, std::path::absolute(dir).unwrap().join("ScaleOutput"));

    let shrink_ratio = partition.shrink[0].ratio;
    assert_eq!(
        Some(dims(&out.join("big.png"))),
        calculate_scaled_dimensions((400, 300), shrink_ratio, 1.0)
    );
    assert_eq!(dims(&out.join("small.png")), (100, 75));
    assert_eq!(
        std::fs::read(out.join("mid.jpg")).unwrap(),
        std::fs::read(dir.join("mid.jpg")).unwrap()
    );
    assert!(!out.join("notes.txt").exists());

    // Originals are untouched.
    assert_eq!(dims(&dir.join("big.png")), (400, 300));
    assert_eq!(size_of(&dir.join("big.png")), big_size);
}

#[test]
fn crop_list_into_explicit_directory() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    solid_jpeg(&dir.join("wide.jpg"), 300, 100);
    solid_png(&dir.join("tall.png"), 80, 240);
    let out_dir = dir.join("cropped");
    std::fs::create_dir(&out_dir).unwrap();

    let backend = RustBackend::new();
    let (tx, rx) = mpsc::channel();
    let pipeline = Pipeline::new(&backend, dir, RunConfig::default()).with_events(tx);
    let mut resolver = OutputResolver::new(Some(out_dir.clone()));

    let out = pipeline
        .crop(
            &Input::Files(vec!["wide.jpg".into(), "tall.png".into()]),
            CropSize {
                width: 100,
                height: 100,
            },
            &mut resolver,
        )
        .unwrap();
    drop(pipeline);

    assert_eq!(out, out_dir);
    assert_eq!(dims(&out.join("wide.jpg")), (100, 100));
    // The window is clamped to the source bounds.
    assert_eq!(dims(&out.join("tall.png")), (80, 100));
    assert!(!dir.join("CropOutput").exists());

    let events: Vec<TransformEvent> = rx.iter().collect();
    assert_eq!(events.len(), 2);
    assert!(
        events
            .iter()
            .all(|e| matches!(e, TransformEvent::Cropped { .. }))
    );
}

#[test]
fn scale_directory_by_half() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    solid_png(&dir.join("a.png"), 200, 120);
    solid_jpeg(&dir.join("b.jpeg"), 64, 64);

    let backend = RustBackend::new();
    let pipeline = Pipeline::new(&backend, dir, RunConfig::default());
    let mut resolver = OutputResolver::new(None);

    let out = pipeline
        .scale(&Input::Directory(dir.to_path_buf()), 0.5, &mut resolver)
        .unwrap();

    assert!(out.ends_with("ScaleOutput"));
    assert_eq!(dims(&out.join("a.png")), (100, 60));
    assert_eq!(dims(&out.join("b.jpeg")), (32, 32));
}

#[test]
fn oversized_scale_is_an_error_not_a_panic() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    solid_png(&dir.join("a.png"), 1000, 1000);

    let backend = RustBackend::new();
    let pipeline = Pipeline::new(&backend, dir, RunConfig::default());
    let mut resolver = OutputResolver::new(None);
    let ratio = crop_scale::commands::percent_ratio(1_000_000_000).unwrap();

    let err = pipeline
        .scale(&Input::Files(vec!["a.png".into()]), ratio, &mut resolver)
        .unwrap_err();

    assert!(err.to_string().contains("output limit"));
    assert!(!dir.join("ScaleOutput").join("a.png").exists());
}

#[test]
fn corrupt_image_stops_inspection() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    solid_png(&dir.join("good.png"), 10, 10);
    std::fs::write(dir.join("broken.jpg"), b"definitely not a jpeg").unwrap();

    let backend = RustBackend::new();
    let pipeline = Pipeline::new(&backend, dir, RunConfig::default());

    assert!(
        pipeline
            .inspect(&Input::Directory(dir.to_path_buf()))
            .is_err()
    );
}
