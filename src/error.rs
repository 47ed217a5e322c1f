//! Error types for snapsort

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for snapsort operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for snapsort
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read EXIF data from {path}: {message}")]
    ExifRead { path: PathBuf, message: String },

    #[error("Source directory does not exist: {0}")]
    SourceNotFound(PathBuf),

    #[error("Cannot compute a destination for {path}: {message}")]
    InvalidDestination { path: PathBuf, message: String },

    #[error("Could not find a collision-free name for {0}")]
    NamingCollision(PathBuf),

    #[error("A sort run is already in progress")]
    SortInProgress,

    #[error("Failed to read config file {path}: {message}")]
    ConfigRead { path: PathBuf, message: String },

    #[error("Failed to parse config file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Directory traversal error: {0}")]
    WalkDir(#[from] walkdir::Error),
}
