//! Error types for target inference.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TargetsError>;

#[derive(Debug, Error)]
pub enum TargetsError {
    #[error("invalid source pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("failed to parse {}: {reason}", .path.display())]
    ProjectJson { path: PathBuf, reason: String },

    #[error(transparent)]
    Manifest(#[from] pkgbuild_core::Error),

    #[error("failed to walk workspace: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
