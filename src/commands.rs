//! Command pipelines.
//!
//! Wires the stages together for each CLI command:
//!
//! ```text
//! crop       scan ──────────────────────────────► transform::crop_files
//! scale      scan ──────────────────────────────► transform::scale_files
//! reduce     scan ─► inspect ─► footprint::plan ─► scale shrink, scale grow, copy unchanged
//! footprint  scan ─► inspect ─► footprint::files_above
//! ```
//!
//! A [`Pipeline`] carries the per-invocation state explicitly: the backend,
//! the working directory, the [`RunConfig`], and an optional progress sender.
//! The [`OutputResolver`] is passed in by `&mut` and resolved before any
//! transform starts.

use crate::config::RunConfig;
use crate::footprint::{self, Partition, PlanError, Thresholds};
use crate::imaging::ImageBackend;
use crate::inspect::{self, InspectError};
use crate::output_dir::{CROP_LABEL, OutputDirError, OutputResolver, SCALE_LABEL};
use crate::scan::{self, ScanError};
use crate::transform::{self, TransformError, TransformEvent};
use crate::types::{CropSize, ImageRef, ScalePlan};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Inspect(#[from] InspectError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    OutputDir(#[from] OutputDirError),
    #[error("Crop needs both --width and --height, each greater than zero")]
    MissingCropSize,
    #[error("Scale percentage must be greater than zero")]
    InvalidScale,
}

/// What a command operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Every image directly inside a directory.
    Directory(PathBuf),
    /// An explicit list of files.
    Files(Vec<PathBuf>),
}

/// Classified input files plus the directory an output dir may be derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collected {
    pub images: Vec<PathBuf>,
    /// The input directory, or the working directory for a non-empty file list.
    pub backup: Option<PathBuf>,
}

/// Validate crop options. Both sides are required and must be non-zero.
pub fn crop_size(width: Option<u32>, height: Option<u32>) -> Result<CropSize, CommandError> {
    match (width, height) {
        (Some(width), Some(height)) if width > 0 && height > 0 => Ok(CropSize { width, height }),
        _ => Err(CommandError::MissingCropSize),
    }
}

/// Convert a scale percentage (`50` = half size) into a ratio.
pub fn percent_ratio(percent: u32) -> Result<f64, CommandError> {
    if percent == 0 {
        return Err(CommandError::InvalidScale);
    }
    Ok(percent as f64 / 100.0)
}

pub struct Pipeline<'a, B: ImageBackend> {
    backend: &'a B,
    cwd: PathBuf,
    run: RunConfig,
    events: Option<Sender<TransformEvent>>,
}

impl<'a, B: ImageBackend> Pipeline<'a, B> {
    pub fn new(backend: &'a B, cwd: impl Into<PathBuf>, run: RunConfig) -> Self {
        Self {
            backend,
            cwd: cwd.into(),
            run,
            events: None,
        }
    }

    /// Send a [`TransformEvent`] for every finished file.
    pub fn with_events(mut self, events: Sender<TransformEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Resolve and classify the command's input.
    pub fn collect(&self, input: &Input) -> Result<Collected, CommandError> {
        match input {
            Input::Directory(dir) => {
                let dir = scan::resolve_input(dir, &self.cwd)?;
                Ok(Collected {
                    images: scan::image_paths_in(&dir)?,
                    backup: Some(dir),
                })
            }
            Input::Files(files) => {
                let resolved = files
                    .iter()
                    .map(|f| scan::resolve_input(f, &self.cwd))
                    .collect::<Result<Vec<_>, _>>()?;
                let backup = (!resolved.is_empty()).then(|| self.cwd.clone());
                Ok(Collected {
                    images: scan::classify_paths(&resolved)?,
                    backup,
                })
            }
        }
    }

    /// Crop every input image to `size`. Returns the output directory.
    pub fn crop(
        &self,
        input: &Input,
        size: CropSize,
        resolver: &mut OutputResolver,
    ) -> Result<PathBuf, CommandError> {
        let collected = self.collect(input)?;
        let out = resolver
            .resolve(collected.backup.as_deref(), CROP_LABEL)?
            .to_path_buf();
        transform::crop_files(
            self.backend,
            &collected.images,
            size,
            &out,
            self.run.quality,
            self.events.as_ref(),
        )?;
        Ok(out)
    }

    /// Scale every input image by `ratio`. Returns the output directory.
    pub fn scale(
        &self,
        input: &Input,
        ratio: f64,
        resolver: &mut OutputResolver,
    ) -> Result<PathBuf, CommandError> {
        let collected = self.collect(input)?;
        let out = resolver
            .resolve(collected.backup.as_deref(), SCALE_LABEL)?
            .to_path_buf();
        let plans: Vec<ScalePlan> = collected
            .images
            .iter()
            .map(|path| ScalePlan::new(path, ratio))
            .collect();
        transform::scale_files(
            self.backend,
            &plans,
            &out,
            self.run.quality,
            self.events.as_ref(),
        )?;
        Ok(out)
    }

    /// Inspect every input image.
    pub fn inspect(&self, input: &Input) -> Result<Vec<ImageRef>, CommandError> {
        let collected = self.collect(input)?;
        Ok(inspect::inspect(self.backend, &collected.images)?)
    }

    /// Inspect every input image for a size report against `byte_limit`.
    ///
    /// The limit is checked before anything is read, so a zero limit is
    /// rejected the same way `plan_footprint` rejects it.
    pub fn footprint(&self, input: &Input, byte_limit: u64) -> Result<Vec<ImageRef>, CommandError> {
        footprint::check_byte_limit(byte_limit)?;
        self.inspect(input)
    }

    /// Plan a footprint reduction for the images in `dir`.
    pub fn plan_footprint(&self, dir: &Path, thresholds: Thresholds) -> Result<Partition, CommandError> {
        let images = self.inspect(&Input::Directory(dir.to_path_buf()))?;
        Ok(footprint::plan(&images, thresholds)?)
    }

    /// Carry out a footprint plan: shrink, then grow, then copy the rest.
    ///
    /// `backup` is the input directory the output dir is derived from when
    /// none was given explicitly.
    pub fn apply_footprint(
        &self,
        partition: &Partition,
        backup: &Path,
        resolver: &mut OutputResolver,
    ) -> Result<PathBuf, CommandError> {
        let backup = scan::resolve_input(backup, &self.cwd)?;
        let out = resolver.resolve(Some(&backup), SCALE_LABEL)?.to_path_buf();
        let events = self.events.as_ref();

        transform::scale_files(self.backend, &partition.shrink, &out, self.run.quality, events)?;
        transform::scale_files(self.backend, &partition.grow, &out, self.run.quality, events)?;
        transform::copy_unchanged(&partition.unchanged, &out, events)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, len: usize) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, vec![1u8; len]).unwrap();
        path
    }

    fn scaled_sources(backend: &MockBackend) -> Vec<(String, f64)> {
        let mut scaled: Vec<(String, f64)> = backend
            .get_operations()
            .into_iter()
            .filter_map(|op| match op {
                RecordedOp::Scale { source, scale, .. } => Some((source, scale)),
                _ => None,
            })
            .collect();
        scaled.sort_by(|a, b| a.0.cmp(&b.0));
        scaled
    }

    #[test]
    fn crop_size_requires_both_sides() {
        assert!(crop_size(Some(10), Some(20)).is_ok());
        assert!(matches!(crop_size(None, Some(20)), Err(CommandError::MissingCropSize)));
        assert!(matches!(crop_size(Some(10), None), Err(CommandError::MissingCropSize)));
        assert!(matches!(crop_size(Some(0), Some(20)), Err(CommandError::MissingCropSize)));
    }

    #[test]
    fn percent_maps_to_ratio() {
        assert_eq!(percent_ratio(50).unwrap(), 0.5);
        assert_eq!(percent_ratio(250).unwrap(), 2.5);
        assert!(matches!(percent_ratio(0), Err(CommandError::InvalidScale)));
    }

    #[test]
    fn collect_file_list_uses_cwd_as_backup() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "a.png", 1);
        write_file(tmp.path(), "notes.txt", 1);
        let backend = MockBackend::new();
        let pipeline = Pipeline::new(&backend, tmp.path(), RunConfig::default());

        let collected = pipeline
            .collect(&Input::Files(vec!["a.png".into(), "notes.txt".into()]))
            .unwrap();
        assert_eq!(collected.images.len(), 1);
        assert_eq!(collected.backup.as_deref(), Some(tmp.path()));
    }

    #[test]
    fn collect_empty_list_has_no_backup() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let pipeline = Pipeline::new(&backend, tmp.path(), RunConfig::default());

        let collected = pipeline.collect(&Input::Files(vec![])).unwrap();
        assert_eq!(collected.backup, None);

        let mut resolver = OutputResolver::new(None);
        let result = pipeline.scale(&Input::Files(vec![]), 0.5, &mut resolver);
        assert!(matches!(result, Err(CommandError::OutputDir(OutputDirError::NoDirectory))));
    }

    #[test]
    fn collect_missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let pipeline = Pipeline::new(&backend, tmp.path(), RunConfig::default());

        let result = pipeline.collect(&Input::Files(vec!["ghost.jpg".into()]));
        assert!(matches!(result, Err(CommandError::Scan(ScanError::NotFound(_)))));
    }

    #[test]
    fn crop_directory_writes_into_crop_output() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "a.png", 1);
        write_file(tmp.path(), "b.jpg", 1);
        let backend = MockBackend::new();
        let pipeline = Pipeline::new(&backend, tmp.path(), RunConfig::default());
        let mut resolver = OutputResolver::new(None);

        let out = pipeline
            .crop(
                &Input::Directory(tmp.path().to_path_buf()),
                CropSize {
                    width: 10,
                    height: 10,
                },
                &mut resolver,
            )
            .unwrap();

        assert_eq!(out, std::path::absolute(tmp.path()).unwrap().join("CropOutput"));
        assert_eq!(backend.get_operations().len(), 2);
    }

    #[test]
    fn scale_list_applies_same_ratio_to_all() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "a.png", 1);
        write_file(tmp.path(), "b.jpeg", 1);
        let backend = MockBackend::new();
        let pipeline = Pipeline::new(&backend, tmp.path(), RunConfig::default());
        let mut resolver = OutputResolver::new(Some(tmp.path().join("explicit")));

        let out = pipeline
            .scale(&Input::Files(vec!["a.png".into(), "b.jpeg".into()]), 0.25, &mut resolver)
            .unwrap();

        assert_eq!(out, tmp.path().join("explicit"));
        assert_eq!(
            scaled_sources(&backend),
            vec![("a.png".to_string(), 0.25), ("b.jpeg".to_string(), 0.25)]
        );
    }

    #[test]
    fn footprint_report_rejects_zero_limit() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "a.png", 10);
        let backend = MockBackend::new();
        let pipeline = Pipeline::new(&backend, tmp.path(), RunConfig::default());
        let input = Input::Directory(tmp.path().to_path_buf());

        let result = pipeline.footprint(&input, 0);
        assert!(matches!(result, Err(CommandError::Plan(PlanError::InvalidInput(_)))));
        assert!(backend.get_operations().is_empty());

        assert_eq!(pipeline.footprint(&input, 5).unwrap().len(), 1);
    }

    #[test]
    fn scale_with_input_directory_as_output_is_refused() {
        let tmp = TempDir::new().unwrap();
        let original = write_file(tmp.path(), "a.png", 10);
        let backend = MockBackend::new();
        let pipeline = Pipeline::new(&backend, tmp.path(), RunConfig::default());
        let mut resolver = OutputResolver::new(Some(tmp.path().to_path_buf()));

        let result = pipeline.scale(&Input::Directory(tmp.path().to_path_buf()), 0.5, &mut resolver);
        assert!(matches!(
            result,
            Err(CommandError::Transform(TransformError::InPlace(_)))
        ));
        assert_eq!(std::fs::read(original).unwrap(), vec![1u8; 10]);
    }

    #[test]
    fn footprint_plan_and_apply() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "a.png", 300);
        write_file(tmp.path(), "b.jpg", 1200);
        write_file(tmp.path(), "c.png", 100);
        let backend = MockBackend::with_dimensions(&[
            ("a.png", 800, 600),
            ("b.jpg", 200, 150),
            ("c.png", 50, 90),
        ]);
        let pipeline = Pipeline::new(&backend, tmp.path(), RunConfig::default());
        let thresholds = Thresholds {
            byte_limit: 1000,
            minimum_side: Some(100),
        };

        let partition = pipeline.plan_footprint(tmp.path(), thresholds).unwrap();
        assert_eq!(partition.shrink.len(), 1);
        assert_eq!(partition.grow.len(), 1);
        assert_eq!(partition.unchanged.len(), 1);

        let mut resolver = OutputResolver::new(None);
        let out = pipeline
            .apply_footprint(&partition, tmp.path(), &mut resolver)
            .unwrap();

        assert!(out.ends_with("ScaleOutput"));
        assert_eq!(
            scaled_sources(&backend),
            vec![("b.jpg".to_string(), 1000.0 / 1200.0), ("c.png".to_string(), 2.0)]
        );
        assert_eq!(std::fs::read(out.join("a.png")).unwrap(), vec![1u8; 300]);
    }
}
