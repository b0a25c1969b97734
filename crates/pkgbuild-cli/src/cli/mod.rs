//! Command-line interface definition.
//!
//! - `pkgbuild infer` - print the build map of a manifest
//! - `pkgbuild plan` - print the bundle plans of a project
//! - `pkgbuild targets` - print the targets inferred for a workspace

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// pkgbuild - build maps, bundle plans and task targets for workspace packages
#[derive(Parser, Debug)]
#[command(
    name = "pkgbuild",
    version,
    about = "Inspect how workspace packages are built",
    long_about = "pkgbuild infers which sources a package.json publishes, how each of them\n\
                  is bundled, and which task-runner targets a tagged package gets."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the build map inferred from a package.json
    ///
    /// Maps every source entry (src/<name>.ts) that exists on disk to the
    /// outputs the manifest declares for it.
    Infer(InferArgs),

    /// Print the bundle plans of a project
    ///
    /// Resolves executor options the way a build would (pkgbuild.toml, the
    /// "pkgbuild" manifest field, PKGBUILD_* variables, then flags) and shows
    /// the plugin pipeline and outputs of every entry.
    Plan(PlanArgs),

    /// Print the targets inferred for every tagged package in a workspace
    Targets(TargetsArgs),
}

#[derive(Args, Debug)]
pub struct InferArgs {
    /// Path of the manifest; must be named package.json
    #[arg(value_name = "PACKAGE_JSON")]
    pub manifest: PathBuf,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Project directory holding package.json and src/
    #[arg(value_name = "PROJECT_DIR")]
    pub project_dir: PathBuf,

    /// Named configuration to apply
    #[arg(short, long, value_name = "NAME")]
    pub configuration: Option<String>,

    /// Mirror the source tree in the output
    #[arg(long)]
    pub preserve_modules: bool,

    /// Down-level modern syntax
    #[arg(long)]
    pub transform_modern_syntax: bool,

    /// Manifest path relative to the project directory
    #[arg(long, value_name = "PATH")]
    pub package_json_path: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct TargetsArgs {
    /// Workspace root to search for package.json files
    #[arg(value_name = "ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Fingerprint the sources under this directory instead of the CLI version
    #[arg(long, value_name = "DIR")]
    pub plugin_root: Option<PathBuf>,
}
