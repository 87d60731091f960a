//! CLI output formatting.
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and, where the binary needs it, a `print_*` wrapper that writes
//! to stdout. Format functions do no I/O and read no environment; the
//! home directory used for `~` abbreviation is passed in.
//!
//! # Output Format
//!
//! ## reduce-memory-footprint
//!
//! ```text
//! 🏞 Found 1 to scale down, 2 ok for memory
//! - ~/photos/b.jpg
//!
//! Others
//! - ~/photos/c.png (scale up x2.00)
//! - ~/photos/a.png
//! ```
//!
//! ## footprint
//!
//! ```text
//! Files >= 1Mb
//! ~/photos/b.jpg, 1200000
//! 2 under the limit
//! ```
//!
//! ## Per-file transform (verbose adds the size lines)
//!
//! ```text
//! 🏙  Original image size: 200x150
//! 🏙  Scaled image size: 167x125
//! 📁 Saved to: /photos/ScaleOutput/b.jpg
//! ```

use crate::footprint::{MEGABYTE, Partition};
use crate::transform::TransformEvent;
use crate::types::ImageRef;
use std::path::Path;

/// Display a path, abbreviating the home directory to `~`.
pub fn pretty_path(path: &Path, home: Option<&Path>) -> String {
    match home.and_then(|h| path.strip_prefix(h).ok()) {
        Some(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Some(rest) => format!("~/{}", rest.display()),
        None => path.display().to_string(),
    }
}

fn home_dir() -> Option<std::path::PathBuf> {
    std::env::var_os("HOME").map(std::path::PathBuf::from)
}

// ============================================================================
// reduce-memory-footprint
// ============================================================================

/// Summary of a footprint plan: what shrinks, and everything else.
pub fn format_partition_report(partition: &Partition, home: Option<&Path>) -> Vec<String> {
    let mut lines = vec![format!(
        "🏞 Found {} to scale down, {} ok for memory",
        partition.shrink.len(),
        partition.ok_for_memory()
    )];
    for plan in &partition.shrink {
        lines.push(format!("- {}", pretty_path(&plan.path, home)));
    }

    lines.push(String::new());
    lines.push("Others".to_string());
    for plan in &partition.grow {
        lines.push(format!(
            "- {} (scale up x{:.2})",
            pretty_path(&plan.path, home),
            plan.ratio
        ));
    }
    for path in &partition.unchanged {
        lines.push(format!("- {}", pretty_path(path, home)));
    }
    lines
}

pub fn print_partition_report(partition: &Partition) {
    for line in format_partition_report(partition, home_dir().as_deref()) {
        println!("{}", line);
    }
}

// ============================================================================
// footprint
// ============================================================================

/// Files at or above the limit, with their byte sizes.
pub fn format_footprint_report(
    above: &[&ImageRef],
    below: &[&ImageRef],
    byte_limit: u64,
    home: Option<&Path>,
) -> Vec<String> {
    let mut lines = vec![format!("Files >= {}Mb", byte_limit / MEGABYTE)];
    for image in above {
        lines.push(format!(
            "{}, {}",
            pretty_path(&image.path, home),
            image.byte_size
        ));
    }
    lines.push(format!("{} under the limit", below.len()));
    lines
}

pub fn print_footprint_report(above: &[&ImageRef], below: &[&ImageRef], byte_limit: u64) {
    for line in format_footprint_report(above, below, byte_limit, home_dir().as_deref()) {
        println!("{}", line);
    }
}

// ============================================================================
// Per-file transform events
// ============================================================================

/// Lines for one finished file. Size lines only appear in verbose mode.
pub fn format_transform_event(event: &TransformEvent, verbose: bool) -> Vec<String> {
    let mut lines = Vec::new();
    match event {
        TransformEvent::Scaled {
            output, resampled, ..
        } => {
            if verbose {
                lines.push(format!("🏙  Original image size: {}", resampled.source));
                lines.push(format!("🏙  Scaled image size: {}", resampled.result));
            }
            lines.push(format!("📁 Saved to: {}", output.display()));
        }
        TransformEvent::Cropped {
            output, resampled, ..
        } => {
            if verbose {
                lines.push(format!("🏙  Original image size: {}", resampled.source));
                lines.push(format!("🏙  Cropped image size: {}", resampled.result));
            }
            lines.push(format!("📁 Saved to: {}", output.display()));
        }
        TransformEvent::Copied { output, .. } => {
            lines.push(format!("📁 Copied to: {}", output.display()));
        }
    }
    lines
}
