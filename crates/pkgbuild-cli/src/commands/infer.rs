//! `pkgbuild infer <package.json>`

use pkgbuild_core::{NativeRuntime, infer_build_map, read_package_json};
use std::path::Path;
use tracing::debug;

use crate::cli::InferArgs;
use crate::commands::utils::print_json;
use crate::error::{Result, ResultExt};

/// Print the build map of `args.manifest`. Entries are resolved next to the
/// manifest.
pub async fn execute(args: InferArgs) -> Result<()> {
    let runtime = NativeRuntime::new();
    let manifest = read_package_json(&runtime, &args.manifest)
        .await
        .with_path(&args.manifest)?;

    let package_dir = args.manifest.parent().unwrap_or(Path::new(""));
    let build_map = infer_build_map(&runtime, package_dir, Path::new(""), &manifest)?;
    debug!("Inferred {} entries from {}", build_map.len(), args.manifest.display());

    print_json(&build_map)
}
