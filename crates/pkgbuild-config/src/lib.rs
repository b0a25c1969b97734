//! # pkgbuild-config
//!
//! Executor options and the workspace facts needed to locate a project.
//!
//! Options come from several layers (see [`loading`]); named configurations
//! such as `development` and `production` overlay the base options before
//! environment variables and CLI flags are applied.

pub mod error;
pub mod loading;
pub mod options;
pub mod workspace;

pub use error::{ConfigError, Result};
pub use loading::{ENV_PREFIX, MANIFEST_FIELD, OPTIONS_FILE, OptionOverrides, OptionsLoader};
pub use options::{BuildType, ExecutorOptions, TargetOptions, merge_values};
pub use workspace::{DEFAULT_LIBS_DIR, ExecutorContext, NX_JSON, WorkspaceLayout};
