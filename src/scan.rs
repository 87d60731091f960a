//! Input path resolution and image classification.
//!
//! First stage of every command. Takes either a directory or an explicit list
//! of paths from the command line and narrows it down to the image files the
//! rest of the pipeline will touch.
//!
//! ## Rules
//!
//! - Paths are absolute, or relative to the current working directory.
//! - Every path named on the command line must exist ([`ScanError::NotFound`]).
//! - Only files with the extension `jpg`, `jpeg` or `png` are kept. The match
//!   is case-sensitive and file contents are never sniffed.
//! - Directory scans are non-recursive; subdirectories are ignored.
//! - Anything that is not an image is dropped silently.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Path not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Extensions accepted as images. Case-sensitive.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Returns true if the path carries one of the [`IMAGE_EXTENSIONS`].
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e))
}

/// Resolve a command-line path against `cwd` and normalize it.
///
/// Absolute paths are taken as-is, relative paths are joined onto `cwd`.
/// The resolved path must exist.
pub fn resolve_input(arg: &Path, cwd: &Path) -> Result<PathBuf, ScanError> {
    let joined = if arg.is_absolute() {
        arg.to_path_buf()
    } else {
        cwd.join(arg)
    };
    let resolved = std::path::absolute(&joined).map_err(|source| ScanError::Io {
        path: joined.clone(),
        source,
    })?;
    if !resolved.exists() {
        return Err(ScanError::NotFound(resolved));
    }
    Ok(resolved)
}

/// List the image files directly inside `dir`, sorted by path.
pub fn image_paths_in(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if !dir.exists() {
        return Err(ScanError::NotFound(dir.to_path_buf()));
    }
    let entries = fs::read_dir(dir).map_err(|source| ScanError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ScanError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && is_image(&path) {
            paths.push(path);
        }
    }
    paths.sort();

    tracing::debug!(dir = %dir.display(), count = paths.len(), "classified directory");
    Ok(paths)
}

/// Keep the image files out of an explicit list, preserving order.
///
/// Fails on the first path that does not exist.
pub fn classify_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>, ScanError> {
    if let Some(missing) = paths.iter().find(|p| !p.exists()) {
        return Err(ScanError::NotFound(missing.clone()));
    }
    Ok(paths.iter().filter(|p| is_image(p)).cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"x").unwrap();
        path
    }

    #[test]
    fn is_image_accepts_known_extensions() {
        assert!(is_image(Path::new("/a/photo.jpg")));
        assert!(is_image(Path::new("/a/photo.jpeg")));
        assert!(is_image(Path::new("/a/photo.png")));
    }

    #[test]
    fn is_image_is_case_sensitive() {
        assert!(!is_image(Path::new("/a/photo.JPG")));
        assert!(!is_image(Path::new("/a/photo.Png")));
    }

    #[test]
    fn is_image_rejects_others() {
        assert!(!is_image(Path::new("/a/notes.txt")));
        assert!(!is_image(Path::new("/a/photo.webp")));
        assert!(!is_image(Path::new("/a/png")));
    }

    #[test]
    fn directory_scan_keeps_only_images() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "b.png");
        touch(tmp.path(), "a.jpg");
        touch(tmp.path(), "readme.md");
        touch(tmp.path(), "upper.JPG");

        let names: Vec<String> = image_paths_in(tmp.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.png"]);
    }

    #[test]
    fn directory_scan_is_not_recursive() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "top.png");
        let nested = tmp.path().join("nested.png");
        fs::create_dir(&nested).unwrap();
        touch(&nested, "deep.png");

        let paths = image_paths_in(tmp.path()).unwrap();
        assert_eq!(paths, vec![tmp.path().join("top.png")]);
    }

    #[test]
    fn directory_scan_missing_dir_is_not_found() {
        let result = image_paths_in(Path::new("/nonexistent/crop-scale-dir"));
        assert!(matches!(result, Err(ScanError::NotFound(_))));
    }

    #[test]
    fn classify_drops_non_images() {
        let tmp = TempDir::new().unwrap();
        let img = touch(tmp.path(), "one.jpeg");
        let txt = touch(tmp.path(), "two.txt");

        assert_eq!(classify_paths(&[img.clone(), txt]).unwrap(), vec![img]);
    }

    #[test]
    fn classify_fails_on_missing_path() {
        let tmp = TempDir::new().unwrap();
        let img = touch(tmp.path(), "one.png");
        let missing = tmp.path().join("gone.png");

        let result = classify_paths(&[img, missing.clone()]);
        assert!(matches!(result, Err(ScanError::NotFound(p)) if p == missing));
    }

    #[test]
    fn resolve_relative_against_cwd() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "rel.png");

        let resolved = resolve_input(Path::new("rel.png"), tmp.path()).unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(resolved, std::path::absolute(tmp.path().join("rel.png")).unwrap());
    }

    #[test]
    fn resolve_absolute_ignores_cwd() {
        let tmp = TempDir::new().unwrap();
        let abs = touch(tmp.path(), "abs.png");

        let resolved = resolve_input(&abs, Path::new("/somewhere/else")).unwrap();
        assert_eq!(resolved, std::path::absolute(&abs).unwrap());
    }

    #[test]
    fn resolve_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let result = resolve_input(Path::new("nope.jpg"), tmp.path());
        assert!(matches!(result, Err(ScanError::NotFound(_))));
    }
}
