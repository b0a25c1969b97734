//! Filesystem abstraction used by inference and the build orchestrator.
//!
//! Nothing in the core touches `std::fs` directly. The resolver only asks
//! whether a synthesized entry exists, and the orchestrator reads the
//! manifest, clears the previous output and writes emitted files. All of that
//! goes through the [`Runtime`] trait so tests and embedders can swap the
//! backing store.

#[cfg(not(target_family = "wasm"))]
pub mod native;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// Other runtime error
    #[error("Runtime error: {0}")]
    Other(String),
}

/// Filesystem collaborator.
///
/// `exists` is synchronous because the resolver calls it once per candidate
/// entry while walking the manifest; everything else suspends.
#[async_trait]
pub trait Runtime: Send + Sync + std::fmt::Debug {
    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Read a file from the filesystem
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Read a file and decode it as UTF-8
    async fn read_to_string(&self, path: &Path) -> RuntimeResult<String> {
        let bytes = self.read_file(path).await?;
        String::from_utf8(bytes)
            .map_err(|e| RuntimeError::Io(format!("{} is not valid UTF-8: {}", path.display(), e)))
    }

    /// Write a file, replacing any previous content
    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()>;

    /// Create a directory
    async fn create_dir(&self, path: &Path, recursive: bool) -> RuntimeResult<()>;

    /// Recursively remove a directory. Removing a missing directory succeeds.
    async fn remove_dir_all(&self, path: &Path) -> RuntimeResult<()>;
}
