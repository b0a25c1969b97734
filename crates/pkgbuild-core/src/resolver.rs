//! Exports-graph resolver.
//!
//! Turns a manifest's `main`/`module`/`exports` declarations into a
//! [`BuildMap`]. Resolution is split in two:
//!
//! - [`resolve_manifest`] is pure. It parses `exports` into [`Exports`] once and
//!   folds every leaf into a map with [`BuildMap::merge`].
//! - [`infer_build_map`] re-roots that map under the manifest's directory and
//!   drops entries whose source file is missing. The existence check is the
//!   only I/O performed here.
//!
//! # Leaf rule
//!
//! A target contributes an output only when it ends in `.js`, `.mjs` or
//! `.cjs`. The extension wins over the surrounding condition: `.cjs` is always
//! CommonJS, `.mjs` is always ESM, and `.js` keeps whatever the context says
//! (`auto` when nothing does).
//!
//! ```
//! use pkgbuild_core::{resolve_manifest, DescriptorFormat, Manifest};
//! use serde_json::json;
//!
//! let manifest: Manifest = serde_json::from_value(json!({
//!     "exports": {
//!         ".": { "import": "./dist/index.mjs", "require": "./dist/index.cjs" },
//!         "./cli": "./dist/out.js"
//!     }
//! })).unwrap();
//!
//! let map = resolve_manifest(&manifest).unwrap();
//! let index = map.get("src/index.ts").unwrap();
//! assert_eq!(index[0].format, DescriptorFormat::Esm);
//! assert_eq!(index[1].format, DescriptorFormat::CommonJs);
//! assert_eq!(map.get("src/cli.ts").unwrap()[0].format, DescriptorFormat::Auto);
//! ```

use serde_json::Value;
use std::path::Path;
use tracing::debug;

use crate::build_map::{BuildMap, DescriptorFormat, OutputDescriptor, join_posix};
use crate::exports::{ConditionTarget, Exports, ExportsError, SubPath, SubPathTarget};
use crate::manifest::Manifest;
use crate::runtime::Runtime;
use crate::Result;

const MODULE_EXTENSIONS: [&str; 3] = [".js", ".mjs", ".cjs"];

/// Which name the synthesized entry takes.
#[derive(Clone, Copy)]
enum EntryName<'a> {
    /// Named after an export key.
    SubPath(&'a SubPath),
    /// Named after the target file's stem (array exports).
    FileStem,
}

/// Resolve the manifest into a build map without touching the filesystem.
pub fn resolve_manifest(manifest: &Manifest) -> std::result::Result<BuildMap, ExportsError> {
    let exports = match manifest.exports.as_ref() {
        None | Some(Value::Null) => None,
        Some(value) => Some(Exports::parse(value)?),
    };

    Ok(match exports {
        Some(exports) => resolve_exports(&exports),
        None => resolve_main_and_module(manifest),
    })
}

/// Resolve the manifest and keep only entries whose source exists.
///
/// `manifest_dir` is the manifest's directory relative to `package_dir`; it is
/// empty for a manifest at the package root.
pub fn infer_build_map<R>(
    runtime: &R,
    package_dir: &Path,
    manifest_dir: &Path,
    manifest: &Manifest,
) -> Result<BuildMap>
where
    R: Runtime + ?Sized,
{
    let build_map = resolve_manifest(manifest)?.relocate(manifest_dir);

    Ok(build_map.retain_entries(|entry| {
        let found = runtime.exists(&package_dir.join(entry));
        if !found {
            debug!("Skipping {entry}: source file not found");
        }
        found
    }))
}

fn resolve_main_and_module(manifest: &Manifest) -> BuildMap {
    let root = SubPath::root();
    let main = manifest
        .main_entry()
        .map(|file| leaf(file, EntryName::SubPath(&root), DescriptorFormat::CommonJs))
        .unwrap_or_default();
    let module = manifest
        .module_entry()
        .map(|file| leaf(file, EntryName::SubPath(&root), DescriptorFormat::Esm))
        .unwrap_or_default();

    main.merge(&module)
}

fn resolve_exports(exports: &Exports) -> BuildMap {
    let root = SubPath::root();

    match exports {
        Exports::Root(file) => leaf(file, EntryName::SubPath(&root), DescriptorFormat::Auto),
        Exports::List(files) => files.iter().fold(BuildMap::new(), |map, file| {
            map.merge(&leaf(file, EntryName::FileStem, DescriptorFormat::Auto))
        }),
        Exports::SubPaths(sub_paths) => {
            sub_paths
                .iter()
                .fold(BuildMap::new(), |map, (sub_path, target)| match target {
                    SubPathTarget::File(file) => map.merge(&leaf(
                        file,
                        EntryName::SubPath(sub_path),
                        DescriptorFormat::Auto,
                    )),
                    SubPathTarget::Conditions(conditions) => {
                        conditions.iter().fold(map, |map, (condition, file)| {
                            map.merge(&leaf(
                                file,
                                EntryName::SubPath(sub_path),
                                condition.format(),
                            ))
                        })
                    }
                })
        }
        Exports::Conditions(conditions) => {
            conditions
                .iter()
                .fold(BuildMap::new(), |map, (condition, target)| match target {
                    ConditionTarget::File(file) => map.merge(&leaf(
                        file,
                        EntryName::SubPath(&root),
                        condition.format(),
                    )),
                    ConditionTarget::SubPaths(sub_paths) => {
                        sub_paths.iter().fold(map, |map, (sub_path, file)| {
                            map.merge(&leaf(
                                file,
                                EntryName::SubPath(sub_path),
                                condition.format(),
                            ))
                        })
                    }
                })
        }
    }
}

/// Build map for a single target file.
fn leaf(file: &str, name: EntryName<'_>, context: DescriptorFormat) -> BuildMap {
    if !is_module_file(file) {
        return BuildMap::new();
    }

    let format = if file.ends_with(".cjs") {
        DescriptorFormat::CommonJs
    } else if file.ends_with(".mjs") {
        DescriptorFormat::Esm
    } else {
        context
    };

    let name = match name {
        EntryName::SubPath(sub_path) => sub_path.entry_name(),
        EntryName::FileStem => match Path::new(file).file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem,
            None => return BuildMap::new(),
        },
    };

    let entry = join_posix(Path::new("src"), &format!("{name}.ts"));
    let output = join_posix(Path::new(""), file);
    BuildMap::single(entry, OutputDescriptor::new(format, output))
}

fn is_module_file(file: &str) -> bool {
    MODULE_EXTENSIONS.iter().any(|ext| file.ends_with(ext))
}
