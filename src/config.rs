//! Configuration types for snapsort

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Sort criterion selecting the destination-subdirectory algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortCriterion {
    /// Sort by capture date: target/<structure rendered from the date>/
    #[default]
    Date,
    /// Sort by initial letter of the filename: target/A/ ... target/Z/
    Name,
    /// Sort by file size tier: target/Small|Medium|Large/
    Size,
}

/// Configuration for one sort run
///
/// Constructed once before a run and never mutated during it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source directory to scan for image files
    pub source_dir: PathBuf,

    /// Target directory for organized files
    pub target_dir: PathBuf,

    /// Sort criterion
    #[serde(default)]
    pub sort_by: SortCriterion,

    /// Structure template for date sorting (e.g. "YYYY/MM/DD").
    /// Empty means the default year/month layout.
    #[serde(default)]
    pub structure: String,

    /// Rename files to <date>_<time> based on their resolved capture date
    #[serde(default)]
    pub rename: bool,

    /// Overwrite existing files at the destination instead of
    /// resolving a collision-free name
    #[serde(default)]
    pub overwrite: bool,

    /// Dry run mode - plan destinations but don't touch the filesystem
    #[serde(default)]
    pub dry_run: bool,

    /// Keep the original file (copy instead of move)
    #[serde(default = "default_keep_original")]
    pub keep_original: bool,

    /// Verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Recognized image extensions
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_keep_original() -> bool {
    true
}

fn default_extensions() -> Vec<String> {
    [
        "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", "nef", "cr2", "arw", "dng",
        "raw",
    ]
    .iter()
    .map(|e| e.to_string())
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::new(),
            target_dir: PathBuf::new(),
            sort_by: SortCriterion::default(),
            structure: String::new(),
            rename: false,
            overwrite: false,
            dry_run: false,
            keep_original: true,
            verbose: false,
            extensions: default_extensions(),
        }
    }
}

impl Config {
    /// Check if a file extension is on the allow-list (case-insensitive)
    pub fn is_supported(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.extensions.iter().any(|e| e == &ext_lower)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# snapsort configuration file
# This file uses TOML format (https://toml.io)

# Source directory to scan for image files (recursively)
source_dir = "D:/Camera"

# Target directory for organized files
target_dir = "D:/Sorted"

# Sort criterion: "date", "name", or "size"
# - date: organize by capture date using the structure template
# - name: organize by the first letter of the filename
# - size: organize into Small / Medium / Large tiers
sort_by = "date"

# Structure template for date sorting. Recognized tokens:
#   YEAR YYYY YY  MONTH MMMM MMM MONTHNUM MM M
#   DAY DDDD DDD DAYNUM DD D  HOUR HH H  MINUTE mm m  SECOND SS S
# Anything else (including path separators) is kept literally.
# Empty means the default year/month layout.
structure = "YYYY/MM"

# Rename files to <yyyyMMdd_HHmmss><original extension>
rename = false

# Overwrite existing destination files instead of appending _1, _2, ...
overwrite = false

# Dry run - report planned destinations without touching any file
dry_run = false

# Keep the original file (copy). Set to false to move instead.
keep_original = true

# Recognized image extensions (matched case-insensitively)
extensions = ["jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", "nef", "cr2", "arw", "dng", "raw"]
"#
        .to_string()
    }
}
