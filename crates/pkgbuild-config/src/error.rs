//! Error types for option loading and workspace discovery.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing project name")]
    MissingProjectName,

    #[error("unknown configuration '{name}' (available: {available})")]
    UnknownConfiguration { name: String, available: String },

    #[error("invalid config value for '{field}': {hint}")]
    InvalidValue { field: String, hint: String },

    #[error("failed to parse {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error(transparent)]
    Manifest(#[from] pkgbuild_core::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
