//! Error handling for the pkgbuild CLI.
//!
//! Library errors convert into [`CliError`] through `#[from]`; [`ResultExt`]
//! attaches paths and hints on the way up, and [`cli_error_to_miette`] turns
//! the final error into a report.
//!
//! ```rust,no_run
//! use pkgbuild_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path).with_path(path)
//! }
//! ```

use miette::Report;
use pkgbuild_core::RuntimeError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Manifest and exports errors
    #[error(transparent)]
    Core(#[from] pkgbuild_core::Error),

    /// Option loading errors (unknown configuration, invalid values, ...)
    #[error("Configuration error: {0}")]
    Config(#[from] pkgbuild_config::ConfigError),

    #[error(transparent)]
    Bundler(#[from] pkgbuild_bundler::Error),

    #[error("Target inference failed: {0}")]
    Targets(#[from] pkgbuild_targets::TargetsError),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Custom(String),
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Adds context to any error convertible into [`CliError`].
pub trait ResultExt<T> {
    /// Report a missing file as [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Append a `Hint:` line to the message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            CliError::Core(pkgbuild_core::Error::Runtime(RuntimeError::FileNotFound(_))) => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }
}

/// Convert a [`CliError`] into a miette report.
///
/// Manifest and bundler errors keep their diagnostic codes and help text.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Bundler(e) => Report::new(e),
        CliError::Core(e) => Report::new(pkgbuild_bundler::Error::from(e)),
        CliError::Config(e) => Report::new(pkgbuild_bundler::Error::Config(e)),
        other => miette::miette!("{}", other),
    }
}
