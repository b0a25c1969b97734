//! Output-format resolution and chunk naming.
//!
//! The same [`ModuleFormat`] decision drives both the output configuration and
//! the file extension chosen at emission, so an `auto` descriptor can never be
//! written as `.mjs` while being bundled as CommonJS.

use pkgbuild_config::ExecutorOptions;
use pkgbuild_core::{DescriptorFormat, Manifest, OutputDescriptor, PackageType};
use serde::Serialize;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Directory emitted files are written to, relative to the package.
pub const DIST_DIR: &str = "dist";

/// Directory sources live in, relative to the package.
pub const SRC_DIR: &str = "src";

/// Concrete module format of one output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleFormat {
    Esm,
    CommonJs,
}

impl ModuleFormat {
    /// Resolve a descriptor against the manifest's `type`.
    ///
    /// `auto` follows the target extension first (`.mjs`, `.cjs`), then the
    /// package type. Explicit formats pass through.
    pub fn resolve(descriptor: &OutputDescriptor, package_type: Option<PackageType>) -> Self {
        match descriptor.format {
            DescriptorFormat::Esm => ModuleFormat::Esm,
            DescriptorFormat::CommonJs => ModuleFormat::CommonJs,
            DescriptorFormat::Auto => {
                let file = descriptor.file.as_deref().unwrap_or_default();
                if file.ends_with(".mjs") {
                    ModuleFormat::Esm
                } else if file.ends_with(".cjs") {
                    ModuleFormat::CommonJs
                } else if package_type == Some(PackageType::Module) {
                    ModuleFormat::Esm
                } else {
                    ModuleFormat::CommonJs
                }
            }
        }
    }

    /// Extension of emitted chunks.
    pub fn extension(&self) -> &'static str {
        match self {
            ModuleFormat::Esm => "mjs",
            ModuleFormat::CommonJs => "cjs",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleFormat::Esm => "esm",
            ModuleFormat::CommonJs => "commonjs",
        }
    }
}

impl fmt::Display for ModuleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the engine knows about a chunk before rendering it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreRenderedChunk {
    pub name: String,
    pub is_entry: bool,
    /// Absolute path of the module the chunk re-exports, if any.
    pub facade_module_id: Option<PathBuf>,
}

impl PreRenderedChunk {
    pub fn entry(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_entry: true,
            facade_module_id: None,
        }
    }

    pub fn chunk(name: impl Into<String>, facade_module_id: Option<PathBuf>) -> Self {
        Self {
            name: name.into(),
            is_entry: false,
            facade_module_id,
        }
    }
}

/// Names entry and shared chunks for one output.
///
/// `[hash]` is left in place for the engine to substitute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkNamer {
    format: ModuleFormat,
    src_dir: PathBuf,
}

impl ChunkNamer {
    pub fn new(format: ModuleFormat, src_dir: impl Into<PathBuf>) -> Self {
        Self {
            format,
            src_dir: src_dir.into(),
        }
    }

    pub fn file_name(&self, chunk: &PreRenderedChunk) -> String {
        let name = strip_lowercase_extension(&chunk.name);
        let ext = self.format.extension();

        if chunk.is_entry {
            return format!("{name}.{ext}");
        }

        if let Some(facade) = chunk
            .facade_module_id
            .as_deref()
            .filter(|facade| is_typescript(facade))
        {
            // mirror the source tree
            let relative = relative_path(&self.src_dir, facade).with_extension("");
            return format!("{}-[hash].{ext}", to_posix(&relative));
        }

        format!("{name}-[hash].{ext}")
    }
}

/// Generated-code preset shared by every output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCode {
    pub preset: &'static str,
    pub const_bindings: bool,
    pub object_shorthand: bool,
}

impl Default for GeneratedCode {
    fn default() -> Self {
        Self {
            preset: "es2015",
            const_bindings: true,
            object_shorthand: true,
        }
    }
}

/// Resolved output configuration for one descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    pub format: ModuleFormat,
    pub dir: PathBuf,
    /// The manifest target this output was derived from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub chunk_names: ChunkNamer,
    pub asset_file_names: String,
    pub sourcemap: bool,
    pub generated_code: GeneratedCode,
    pub exports: &'static str,
    pub preserve_modules: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_modules_root: Option<PathBuf>,
}

impl OutputConfig {
    /// File name of an entry or shared chunk.
    pub fn chunk_file_name(&self, chunk: &PreRenderedChunk) -> String {
        self.chunk_names.file_name(chunk)
    }
}

/// One [`OutputConfig`] per descriptor, in order.
pub fn create_output_configs(
    package_dir: &Path,
    manifest: &Manifest,
    descriptors: &[OutputDescriptor],
    options: &ExecutorOptions,
) -> Vec<OutputConfig> {
    let src_dir = package_dir.join(SRC_DIR);
    let preserve_modules = options.preserves_modules();

    descriptors
        .iter()
        .map(|descriptor| {
            let format = ModuleFormat::resolve(descriptor, manifest.package_type);
            OutputConfig {
                format,
                dir: package_dir.join(DIST_DIR),
                file: descriptor.file.clone(),
                chunk_names: ChunkNamer::new(format, &src_dir),
                asset_file_names: "[name]-[hash].[ext]".to_string(),
                sourcemap: true,
                generated_code: GeneratedCode::default(),
                exports: "named",
                preserve_modules,
                preserve_modules_root: preserve_modules.then(|| src_dir.clone()),
            }
        })
        .collect()
}

/// Drop a trailing `.[a-z]+` suffix.
fn strip_lowercase_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() && ext.bytes().all(|b| b.is_ascii_lowercase()) => {
            stem
        }
        _ => name,
    }
}

fn is_typescript(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("ts" | "tsx")
    )
}

/// Relative path from `base` to `target`, climbing with `..` when needed.
fn relative_path(base: &Path, target: &Path) -> PathBuf {
    if let Ok(stripped) = target.strip_prefix(base) {
        return stripped.to_path_buf();
    }

    let base: Vec<Component<'_>> = base.components().collect();
    let target: Vec<Component<'_>> = target.components().collect();
    let common = base
        .iter()
        .zip(&target)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push("..");
    }
    for component in &target[common..] {
        relative.push(component.as_os_str());
    }
    relative
}

fn to_posix(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn auto(file: &str) -> OutputDescriptor {
        OutputDescriptor::new(DescriptorFormat::Auto, file)
    }

    #[test]
    fn test_auto_follows_extension() {
        assert_eq!(ModuleFormat::resolve(&auto("dist/a.mjs"), None), ModuleFormat::Esm);
        assert_eq!(
            ModuleFormat::resolve(&auto("dist/a.cjs"), Some(PackageType::Module)),
            ModuleFormat::CommonJs
        );
    }

    #[test]
    fn test_auto_follows_package_type() {
        assert_eq!(
            ModuleFormat::resolve(&auto("dist/a.js"), Some(PackageType::Module)),
            ModuleFormat::Esm
        );
        assert_eq!(
            ModuleFormat::resolve(&auto("dist/a.js"), Some(PackageType::CommonJs)),
            ModuleFormat::CommonJs
        );
        assert_eq!(ModuleFormat::resolve(&auto("dist/a.js"), None), ModuleFormat::CommonJs);
    }

    #[test]
    fn test_explicit_format_passes_through() {
        let descriptor = OutputDescriptor::new(DescriptorFormat::Esm, "dist/a.js");
        assert_eq!(
            ModuleFormat::resolve(&descriptor, Some(PackageType::CommonJs)),
            ModuleFormat::Esm
        );
    }

    #[test]
    fn test_strip_lowercase_extension() {
        assert_eq!(strip_lowercase_extension("index.ts"), "index");
        assert_eq!(strip_lowercase_extension("a.b.js"), "a.b");
        assert_eq!(strip_lowercase_extension("index"), "index");
        assert_eq!(strip_lowercase_extension("index.D"), "index.D");
        assert_eq!(strip_lowercase_extension("index."), "index.");
    }

    #[test]
    fn test_entry_chunk_name() {
        let namer = ChunkNamer::new(ModuleFormat::Esm, "/repo/libs/ui/src");
        assert_eq!(namer.file_name(&PreRenderedChunk::entry("index")), "index.mjs");

        let namer = ChunkNamer::new(ModuleFormat::CommonJs, "/repo/libs/ui/src");
        assert_eq!(namer.file_name(&PreRenderedChunk::entry("cli.ts")), "cli.cjs");
    }

    #[test]
    fn test_typescript_facade_mirrors_source_tree() {
        let namer = ChunkNamer::new(ModuleFormat::Esm, "/repo/libs/ui/src");
        let chunk = PreRenderedChunk::chunk(
            "button",
            Some(PathBuf::from("/repo/libs/ui/src/components/button.tsx")),
        );
        assert_eq!(namer.file_name(&chunk), "components/button-[hash].mjs");
    }

    #[test]
    fn test_plain_chunk_name() {
        let namer = ChunkNamer::new(ModuleFormat::CommonJs, "/repo/libs/ui/src");
        let chunk = PreRenderedChunk::chunk(
            "vendor.js",
            Some(PathBuf::from("/repo/node_modules/lib/index.js")),
        );
        assert_eq!(namer.file_name(&chunk), "vendor-[hash].cjs");
        assert_eq!(
            namer.file_name(&PreRenderedChunk::chunk("shared", None)),
            "shared-[hash].cjs"
        );
    }

    #[test]
    fn test_relative_path_outside_base() {
        assert_eq!(
            relative_path(Path::new("/repo/libs/ui/src"), Path::new("/repo/libs/core/src/a.ts")),
            PathBuf::from("../../core/src/a.ts")
        );
    }

    #[test]
    fn test_create_output_configs() {
        let manifest: Manifest = serde_json::from_value(json!({ "type": "module" })).unwrap();
        let descriptors = [
            auto("dist/index.js"),
            OutputDescriptor::new(DescriptorFormat::CommonJs, "dist/index.cjs"),
        ];
        let options = ExecutorOptions::default().preserve_modules(true);

        let configs = create_output_configs(
            Path::new("/repo/libs/ui"),
            &manifest,
            &descriptors,
            &options,
        );

        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].format, ModuleFormat::Esm);
        assert_eq!(configs[1].format, ModuleFormat::CommonJs);
        assert_eq!(configs[0].dir, PathBuf::from("/repo/libs/ui/dist"));
        assert_eq!(
            configs[0].preserve_modules_root,
            Some(PathBuf::from("/repo/libs/ui/src"))
        );
        assert_eq!(configs[0].asset_file_names, "[name]-[hash].[ext]");
        assert_eq!(configs[1].exports, "named");
    }

    #[test]
    fn test_no_preserve_modules_root_by_default() {
        let manifest = Manifest::default();
        let configs = create_output_configs(
            Path::new("/repo/libs/ui"),
            &manifest,
            &[auto("dist/index.js")],
            &ExecutorOptions::default(),
        );
        assert!(!configs[0].preserve_modules);
        assert!(configs[0].preserve_modules_root.is_none());
    }
}
