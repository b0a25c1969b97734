//! # pkgbuild-targets
//!
//! Infers task-runner targets for every package in a workspace from the tags
//! in its manifest (or a sibling `project.json`).
//!
//! | Tag       | Target               |
//! |-----------|----------------------|
//! | `rollup`  | `build`              |
//! | `vitest`  | `test`               |
//! | `eslint`  | `lint`               |
//! | `release` | `nx-release-publish` |
//!
//! Every target also depends on a [`SourceFingerprint`] of the inference code
//! so that changing it invalidates cached task results.

pub mod error;
pub mod fingerprint;
pub mod projects;
pub mod targets;

pub use error::{Result, TargetsError};
pub use fingerprint::{DEFAULT_SOURCE_GLOBS, SourceFingerprint};
pub use projects::{InferredProject, PROJECT_JSON, infer_projects, load_project_manifest};
pub use targets::{
    BUNDLE_EXECUTOR, KnownTag, TargetConfiguration, TargetInput, TargetMetadata, targets_for_manifest,
};
