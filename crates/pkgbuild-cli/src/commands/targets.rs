//! `pkgbuild targets [root]`

use pkgbuild_targets::{SourceFingerprint, infer_projects};
use tracing::{debug, info};

use crate::cli::TargetsArgs;
use crate::commands::utils::print_json;
use crate::error::{CliError, Result};

/// Fingerprint used without `--plugin-root`: target definitions only change
/// with the CLI version.
const PINNED_FINGERPRINT: &str = env!("CARGO_PKG_VERSION");

pub fn execute(args: TargetsArgs) -> Result<()> {
    if !args.root.is_dir() {
        return Err(CliError::FileNotFound(args.root));
    }

    let fingerprint = match &args.plugin_root {
        Some(dir) => {
            debug!("Fingerprinting sources under {}", dir.display());
            SourceFingerprint::with_default_globs(dir)
        }
        None => SourceFingerprint::fixed(PINNED_FINGERPRINT),
    };

    let projects = infer_projects(&args.root, &fingerprint)?;
    info!("Inferred targets for {} projects", projects.len());

    print_json(&projects)
}
