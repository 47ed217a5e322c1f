//! Destination path planning
//!
//! Computes where a source file should land in the target tree: subdirectory
//! from the configured sort criterion, filename from the rename flag, and a
//! collision-free final path when overwriting is disabled.

use crate::config::{Config, SortCriterion};
use crate::error::{Error, Result};
use crate::template;
use chrono::NaiveDateTime;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Size tier boundaries in bytes (strict upper bounds)
pub const SMALL_LIMIT: u64 = 1_000_000;
pub const MEDIUM_LIMIT: u64 = 10_000_000;

/// Bucket name for files whose stem has no characters
const EMPTY_NAME_BUCKET: &str = "Other";

/// Filename pattern used when renaming is requested
const RENAME_PATTERN: &str = "%Y%m%d_%H%M%S";

/// Collision probing gives up after this many numeric suffixes
const COLLISION_CAP: u32 = 10_000;

/// Planned destination for one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDestination {
    /// Destination directory (target root plus computed subdirectory)
    pub directory: PathBuf,
    /// Destination filename
    pub file_name: String,
}

impl PlannedDestination {
    /// Full destination path (directory + filename)
    pub fn full_path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

/// Compute the destination for one source file.
///
/// Pure apart from reading the source file length for the size criterion.
pub fn plan(config: &Config, source: &Path, taken: &NaiveDateTime) -> Result<PlannedDestination> {
    let file_name = source
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::InvalidDestination {
            path: source.to_path_buf(),
            message: "source has no usable filename".into(),
        })?;

    let (stem, extension) = split_name(file_name);

    let mut directory = config.target_dir.clone();
    match config.sort_by {
        SortCriterion::Date => {
            let rendered = template::render(&config.structure, taken);
            for component in rendered.split(['/', '\\']).filter(|c| !c.is_empty()) {
                directory.push(component);
            }
        }
        SortCriterion::Name => {
            directory.push(name_bucket(stem));
        }
        SortCriterion::Size => {
            let len = fs::metadata(source)?.len();
            directory.push(size_bucket(len));
        }
    }

    let file_name = if config.rename {
        let mut renamed = taken.format(RENAME_PATTERN).to_string();
        if !extension.is_empty() {
            renamed.push('.');
            renamed.push_str(extension);
        }
        renamed
    } else {
        file_name.to_string()
    };

    trace!(?source, ?directory, file_name, "Planned destination");

    Ok(PlannedDestination {
        directory,
        file_name,
    })
}

/// Resolve a collision-free destination path by appending `_<n>` to the stem.
///
/// A path counts as taken when it exists on disk or was already planned
/// earlier in the same run; the `planned` set keeps dry runs faithful to
/// what a real run would produce. The chosen path is recorded in `planned`.
pub fn resolve_collision(path: PathBuf, planned: &mut HashSet<PathBuf>) -> Result<PathBuf> {
    if is_free(&path, planned) {
        planned.insert(path.clone());
        return Ok(path);
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::InvalidDestination {
            path: path.clone(),
            message: "destination has no usable filename".into(),
        })?;
    let (stem, extension) = split_name(file_name);
    let parent = path.parent().map(|p| p.to_path_buf()).unwrap_or_default();

    for n in 1..COLLISION_CAP {
        let candidate = if extension.is_empty() {
            parent.join(format!("{}_{}", stem, n))
        } else {
            parent.join(format!("{}_{}.{}", stem, n, extension))
        };
        if is_free(&candidate, planned) {
            planned.insert(candidate.clone());
            return Ok(candidate);
        }
    }

    Err(Error::NamingCollision(path))
}

fn is_free(path: &Path, planned: &HashSet<PathBuf>) -> bool {
    !path.exists() && !planned.contains(path)
}

/// Split a filename at its last dot into (stem, extension).
///
/// Everything after the last dot counts as the extension, so `.jpg` has an
/// empty stem and extension `jpg`, and `photo` has no extension.
pub fn split_name(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) => (&file_name[..idx], &file_name[idx + 1..]),
        None => (file_name, ""),
    }
}

/// Name bucket: upper-cased first character of the stem, or "Other"
fn name_bucket(stem: &str) -> String {
    match stem.chars().next() {
        Some(first) => first.to_uppercase().to_string(),
        None => EMPTY_NAME_BUCKET.to_string(),
    }
}

/// Size bucket from the file length in bytes
fn size_bucket(len: u64) -> &'static str {
    if len < SMALL_LIMIT {
        "Small"
    } else if len < MEDIUM_LIMIT {
        "Medium"
    } else {
        "Large"
    }
}
