//! Native Runtime Implementation
//!
//! Async wrappers around `std::fs`. Blocking calls run on tokio's blocking
//! pool so a current-thread scheduler never stalls on disk I/O.

// The one place that talks to std::fs directly
#![allow(clippy::disallowed_methods)]

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::task;

use super::{Runtime, RuntimeError, RuntimeResult};

/// Native filesystem Runtime implementation using `std::fs`.
///
/// # Example
///
/// ```rust,no_run
/// use pkgbuild_core::runtime::{native::NativeRuntime, Runtime};
/// use std::path::Path;
///
/// # async fn example() -> pkgbuild_core::runtime::RuntimeResult<()> {
/// let runtime = NativeRuntime::new();
/// let manifest = runtime.read_to_string(Path::new("libs/ui/package.json")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRuntime;

impl NativeRuntime {
    /// Create a new NativeRuntime instance.
    pub fn new() -> Self {
        Self
    }
}

fn io_error(action: &str, path: &Path, error: std::io::Error) -> RuntimeError {
    if error.kind() == ErrorKind::NotFound {
        RuntimeError::FileNotFound(path.to_path_buf())
    } else {
        RuntimeError::Io(format!("Failed to {} {}: {}", action, path.display(), error))
    }
}

async fn blocking<T, F>(f: F) -> RuntimeResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> RuntimeResult<T> + Send + 'static,
{
    task::spawn_blocking(f)
        .await
        .map_err(|e| RuntimeError::Other(format!("Task join error: {}", e)))?
}

#[async_trait]
impl Runtime for NativeRuntime {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let path = path.to_path_buf();
        blocking(move || std::fs::read(&path).map_err(|e| io_error("read", &path, e))).await
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        let path = path.to_path_buf();
        let content = content.to_vec();
        blocking(move || std::fs::write(&path, content).map_err(|e| io_error("write", &path, e)))
            .await
    }

    async fn create_dir(&self, path: &Path, recursive: bool) -> RuntimeResult<()> {
        let path: PathBuf = path.to_path_buf();
        blocking(move || {
            let result = if recursive {
                std::fs::create_dir_all(&path)
            } else {
                std::fs::create_dir(&path)
            };
            result.map_err(|e| io_error("create directory", &path, e))
        })
        .await
    }

    async fn remove_dir_all(&self, path: &Path) -> RuntimeResult<()> {
        let path = path.to_path_buf();
        blocking(move || match std::fs::remove_dir_all(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("remove", &path, e)),
        })
        .await
    }
}
