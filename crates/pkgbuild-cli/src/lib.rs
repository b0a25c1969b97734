//! pkgbuild CLI - inspect what a package build would do.
//!
//! - [`cli`] - argument definitions
//! - [`commands`] - `infer`, `plan` and `targets`
//! - [`error`] - CLI errors and their miette rendering
//! - [`logger`] - tracing setup for the global flags
//!
//! Every command prints JSON on stdout; logs go to stderr.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;

pub use error::{CliError, Result, ResultExt};
