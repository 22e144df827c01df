use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error type for dataset construction, path resolution, and item loading.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("invalid configuration: {reason}")]
    Configuration { reason: String },
    #[error("required directory '{}' does not exist", path.display())]
    MissingDirectory { path: PathBuf },
    #[error("metadata file not found at '{}'", path.display())]
    MissingMetadata { path: PathBuf },
    #[error("invalid metadata in '{}': {reason}", path.display())]
    InvalidMetadata { path: PathBuf, reason: String },
    #[error("invalid geometry '{name}': {reason} (allowed: {allowed})")]
    InvalidGeometry {
        name: String,
        reason: String,
        allowed: String,
    },
    #[error(
        "file selection out of range in '{}': requested index {requested}, {available} files available",
        path.display()
    )]
    FileCountMismatch {
        path: PathBuf,
        requested: i64,
        available: usize,
    },
    #[error("item index {index} out of range for dataset of length {len}")]
    IndexRange { index: usize, len: usize },
    #[error("failed to decode array '{}': {reason}", path.display())]
    Array { path: PathBuf, reason: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}
