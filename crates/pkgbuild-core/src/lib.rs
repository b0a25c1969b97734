//! # pkgbuild-core
//!
//! Package manifest model and exports-graph inference.
//!
//! ```text
//! package.json ──▶ Manifest ──▶ Exports (parsed once) ──▶ BuildMap
//!                                                          │
//!                                      Runtime::exists ◀───┘ (drop missing sources)
//! ```
//!
//! The crate performs no direct filesystem access; all I/O goes through the
//! [`runtime::Runtime`] trait. [`runtime::native::NativeRuntime`] is the
//! `std::fs` implementation used by the CLI.

pub mod build_map;
pub mod dedupe;
pub mod exports;
pub mod manifest;
pub mod resolver;
pub mod runtime;

use std::path::PathBuf;

pub use build_map::{BuildMap, DescriptorFormat, OutputDescriptor};
pub use exports::{Condition, ConditionTarget, Exports, ExportsError, SubPath, SubPathTarget};
pub use manifest::{Manifest, PACKAGE_JSON, PackageType, ProjectMetadata, read_package_json};
pub use resolver::{infer_build_map, resolve_manifest};
pub use runtime::{Runtime, RuntimeError, RuntimeResult};

#[cfg(not(target_family = "wasm"))]
pub use runtime::native::NativeRuntime;

/// Error types for manifest reading and inference.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The manifest path does not point at a `package.json`.
    #[error("Expected package.json file: {}", .0.display())]
    NotPackageJson(PathBuf),

    /// The manifest could not be parsed.
    #[error("Invalid manifest {}: {reason}", .path.display())]
    InvalidManifest { path: PathBuf, reason: String },

    /// The `exports` field has an unsupported shape.
    #[error(transparent)]
    InvalidExports(#[from] ExportsError),

    /// Filesystem failure.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
