//! CLI argument parsing with clap

use crate::config::{Config, SortCriterion};
use clap::Parser;
use std::path::PathBuf;

/// snapsort - organize image collections by date, name, or size
///
/// Scans a source directory recursively for image files, resolves a
/// trustworthy capture date per file (EXIF metadata, then file system
/// timestamps, then the current time), and copies or moves each file into
/// a target directory laid out by the chosen sort criterion.
#[derive(Parser, Debug)]
#[command(name = "snapsort")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file (TOML format)
    ///
    /// When specified, settings from the config file are used as defaults.
    /// CLI arguments will override config file settings.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Source directory to scan for image files
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Target directory for organized files
    #[arg(short, long)]
    pub target: Option<PathBuf>,

    /// Sort criterion:
    /// - date: organize by capture date using the structure template
    /// - name: organize by the first letter of the filename
    /// - size: organize into Small/Medium/Large size tiers
    #[arg(short = 'b', long, value_enum)]
    pub sort_by: Option<SortCriterion>,

    /// Structure template for date sorting, e.g. "YYYY/MM/DD"
    /// (empty means the default year/month layout)
    #[arg(short = 'S', long)]
    pub structure: Option<String>,

    /// Rename files to <yyyyMMdd_HHmmss> based on the resolved date
    #[arg(short, long)]
    pub rename: bool,

    /// Overwrite existing destination files instead of appending _1, _2, ...
    #[arg(long)]
    pub overwrite: bool,

    /// Dry run mode - report planned destinations without touching any file
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Move files instead of copying them
    #[arg(long)]
    pub r#move: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output log format as JSON
    #[arg(long)]
    pub json_log: bool,
}

impl Cli {
    /// Get config file name (without extension) for log naming
    pub fn config_name(&self) -> Option<String> {
        self.config.as_ref().and_then(|p| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string())
        })
    }

    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if let Some(ref source) = self.source {
            config.source_dir = source.clone();
        }
        if let Some(ref target) = self.target {
            config.target_dir = target.clone();
        }
        if let Some(sort_by) = self.sort_by {
            config.sort_by = sort_by;
        }
        if let Some(ref structure) = self.structure {
            config.structure = structure.clone();
        }
        if self.rename {
            config.rename = true;
        }
        if self.overwrite {
            config.overwrite = true;
        }
        if self.dry_run {
            config.dry_run = true;
        }
        if self.r#move {
            config.keep_original = false;
        }
        if self.verbose {
            config.verbose = true;
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}
