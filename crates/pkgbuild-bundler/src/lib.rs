#![cfg_attr(docsrs, feature(doc_cfg))]

//! # pkgbuild-bundler
//!
//! Turns a package's build map into bundle plans and drives a
//! [`BundleEngine`] through them.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pkgbuild_bundler::{BundleEngine, run_executor};
//! use pkgbuild_config::{ExecutorContext, ExecutorOptions};
//! use pkgbuild_core::NativeRuntime;
//!
//! # async fn build(engine: &dyn BundleEngine) {
//! let context = ExecutorContext::new("/repo", "@acme/ui");
//! let outcome = run_executor(
//!     &ExecutorOptions::default().clean(true),
//!     &context,
//!     &NativeRuntime::new(),
//!     engine,
//! )
//! .await;
//! assert!(outcome.success);
//! # }
//! ```
//!
//! Module resolution and tree-shaking are the engine's business; this crate
//! decides formats, file names, externals and the plugin pipeline, and owns
//! the warning policy and the checksum artifact.

pub mod checksum;
pub mod engine;
pub mod executor;
pub mod external;
pub mod output;
pub mod plan;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

use miette::Diagnostic;
use pkgbuild_config::ConfigError;
use pkgbuild_core::{ExportsError, RuntimeError};
use std::path::PathBuf;
use thiserror::Error;

pub use checksum::{BuildChecksum, CHECKSUM_SUFFIX};
pub use engine::{
    BundleEngine, BundleWarning, EMPTY_BUNDLE, EngineError, ModuleBundle, OutputFile,
    OutputPlugin, WarningHandler,
};
pub use executor::{ExecutorOutcome, run_executor};
pub use external::ExternalPredicate;
pub use output::{
    ChunkNamer, DIST_DIR, ModuleFormat, OutputConfig, PreRenderedChunk, SRC_DIR,
    create_output_configs,
};
pub use plan::{BundlePlan, InputConfig, PluginSpec, TreeshakePreset, create_bundle_plans};

/// Errors raised while building a package.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// The manifest path does not name a `package.json`.
    #[error("Expected package.json file: {}", .0.display())]
    #[diagnostic(
        code(pkgbuild::not_package_json),
        help("packageJsonPath must point at a file named package.json")
    )]
    NotPackageJson(PathBuf),

    #[error("Invalid manifest {}: {reason}", .path.display())]
    #[diagnostic(code(pkgbuild::invalid_manifest))]
    InvalidManifest { path: PathBuf, reason: String },

    #[error(transparent)]
    #[diagnostic(
        code(pkgbuild::invalid_exports),
        help("Sub-paths and conditions may each be nested once; every value must be a file")
    )]
    InvalidExports(#[from] ExportsError),

    /// Nothing in the manifest maps to an existing source file.
    #[error("Expected at least one config")]
    #[diagnostic(
        code(pkgbuild::no_entries),
        help("Declare main, module or exports and make sure the matching src/<name>.ts exists")
    )]
    NoEntries,

    #[error("Bundling failed: {0}")]
    #[diagnostic(code(pkgbuild::engine))]
    Engine(#[from] EngineError),

    #[error(transparent)]
    #[diagnostic(code(pkgbuild::runtime))]
    Runtime(#[from] RuntimeError),

    /// A release build saw warnings.
    #[error("Build completed with warnings.")]
    #[diagnostic(
        code(pkgbuild::warnings_in_release),
        help("Fix the warnings above or build with the development configuration")
    )]
    WarningsInRelease,

    #[error(transparent)]
    #[diagnostic(code(pkgbuild::config))]
    Config(#[from] ConfigError),
}

impl From<pkgbuild_core::Error> for Error {
    fn from(error: pkgbuild_core::Error) -> Self {
        match error {
            pkgbuild_core::Error::NotPackageJson(path) => Error::NotPackageJson(path),
            pkgbuild_core::Error::InvalidManifest { path, reason } => {
                Error::InvalidManifest { path, reason }
            }
            pkgbuild_core::Error::InvalidExports(err) => Error::InvalidExports(err),
            pkgbuild_core::Error::Runtime(err) => Error::Runtime(err),
        }
    }
}

/// Result type alias for bundler operations.
pub type Result<T> = std::result::Result<T, Error>;
