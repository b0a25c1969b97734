//! Per-entry bundle plans.
//!
//! A plan is everything the engine needs to build one entry point: the input
//! module, the ordered plugin pipeline, the external predicate and one output
//! configuration per declared format.

use indexmap::IndexMap;
use pkgbuild_config::{BuildType, ExecutorOptions};
use pkgbuild_core::{BuildMap, Manifest, Runtime};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::checksum::BuildChecksum;
use crate::engine::OutputPlugin;
use crate::external::ExternalPredicate;
use crate::output::{DIST_DIR, OutputConfig, SRC_DIR, create_output_configs};

/// Stats file written by the visualizer.
pub const BUNDLE_STATS_FILE: &str = "bundle-stats.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    pub declaration: bool,
    pub declaration_map: bool,
    pub source_map: bool,
    pub out_dir: PathBuf,
    pub root_dir: PathBuf,
    pub composite: bool,
}

/// When a TypeScript transformer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TransformerStage {
    Before,
    AfterDeclarations,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transformer {
    pub stage: TransformerStage,
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeScriptOptions {
    pub tsconfig: PathBuf,
    pub exclude: Vec<&'static str>,
    pub output_to_filesystem: bool,
    pub no_emit_on_error: bool,
    pub compiler_options: CompilerOptions,
    pub transformers: Vec<Transformer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizerOptions {
    pub template: &'static str,
    pub filename: &'static str,
    pub project_root: PathBuf,
    pub sourcemap: bool,
    pub emit_file: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceOptions {
    pub prevent_assignment: bool,
    pub values: IndexMap<&'static str, &'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BabelOptions {
    pub babelrc: bool,
    pub extensions: Vec<&'static str>,
    pub babel_helpers: &'static str,
    pub browserslist_env: &'static str,
    pub presets: Vec<&'static str>,
    pub plugins: Vec<&'static str>,
    pub cwd: PathBuf,
    pub import_attributes_keyword: &'static str,
}

/// One step of the engine's plugin pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "name", content = "options")]
pub enum PluginSpec {
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "node-resolve")]
    NodeResolve,
    #[serde(rename = "typescript")]
    TypeScript(TypeScriptOptions),
    #[serde(rename = "visualizer")]
    Visualizer(VisualizerOptions),
    #[serde(rename = "replace")]
    Replace(ReplaceOptions),
    #[serde(rename = "commonjs")]
    CommonJs,
    #[serde(rename = "babel")]
    Babel(BabelOptions),
    #[serde(rename = "build-checksum")]
    BuildChecksum { input: String },
}

impl PluginSpec {
    pub fn name(&self) -> &'static str {
        match self {
            PluginSpec::Json => "json",
            PluginSpec::NodeResolve => "node-resolve",
            PluginSpec::TypeScript(_) => "typescript",
            PluginSpec::Visualizer(_) => "visualizer",
            PluginSpec::Replace(_) => "replace",
            PluginSpec::CommonJs => "commonjs",
            PluginSpec::Babel(_) => "babel",
            PluginSpec::BuildChecksum { .. } => "build-checksum",
        }
    }
}

/// Tree-shaking preset handed to the engine. Library builds always use the
/// engine's recommended settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeshakePreset {
    #[default]
    Recommended,
}

/// Input side of one bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputConfig {
    /// Absolute path of the entry module.
    pub input: PathBuf,
    /// Entry as declared in the build map (`src/index.ts`).
    pub entry: String,
    pub plugins: Vec<PluginSpec>,
    pub external: ExternalPredicate,
    pub treeshake: TreeshakePreset,
    pub strict_deprecations: bool,
    pub cache: bool,
}

impl InputConfig {
    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(PluginSpec::name).collect()
    }

    /// Plugins the executor runs on generated files.
    pub fn output_plugins(&self) -> Vec<Box<dyn OutputPlugin>> {
        self.plugins
            .iter()
            .filter_map(|plugin| match plugin {
                PluginSpec::BuildChecksum { input } => {
                    Some(Box::new(BuildChecksum::new(input.clone())) as Box<dyn OutputPlugin>)
                }
                _ => None,
            })
            .collect()
    }
}

/// Input plus outputs for one build map entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundlePlan {
    pub input: InputConfig,
    pub outputs: Vec<OutputConfig>,
}

/// One plan per build map entry, in build map order.
pub fn create_bundle_plans<R>(
    runtime: &R,
    workspace_dir: &Path,
    package_dir: &Path,
    manifest: &Manifest,
    build_map: &BuildMap,
    options: &ExecutorOptions,
) -> Vec<BundlePlan>
where
    R: Runtime + ?Sized,
{
    let external = ExternalPredicate::from_manifest(manifest);

    build_map
        .iter()
        .map(|(entry, descriptors)| BundlePlan {
            input: InputConfig {
                input: package_dir.join(entry),
                entry: entry.to_string(),
                plugins: plugin_pipeline(runtime, workspace_dir, package_dir, entry, options),
                external: external.clone(),
                treeshake: TreeshakePreset::Recommended,
                strict_deprecations: true,
                cache: false,
            },
            outputs: create_output_configs(package_dir, manifest, descriptors, options),
        })
        .collect()
}

fn plugin_pipeline<R>(
    runtime: &R,
    workspace_dir: &Path,
    package_dir: &Path,
    entry: &str,
    options: &ExecutorOptions,
) -> Vec<PluginSpec>
where
    R: Runtime + ?Sized,
{
    let mut plugins = vec![
        PluginSpec::Json,
        PluginSpec::NodeResolve,
        PluginSpec::TypeScript(TypeScriptOptions {
            tsconfig: find_tsconfig(runtime, package_dir, entry),
            exclude: vec!["**/*.spec.ts", "**/*.spec.tsx"],
            output_to_filesystem: false,
            no_emit_on_error: true,
            compiler_options: CompilerOptions {
                declaration: true,
                declaration_map: true,
                source_map: true,
                out_dir: package_dir.join(DIST_DIR),
                root_dir: PathBuf::from(SRC_DIR),
                composite: false,
            },
            transformers: vec![
                Transformer {
                    stage: TransformerStage::Before,
                    name: "optimize-const-enum",
                },
                Transformer {
                    stage: TransformerStage::AfterDeclarations,
                    name: "optimize-const-enum",
                },
            ],
        }),
        PluginSpec::Visualizer(VisualizerOptions {
            template: "raw-data",
            filename: BUNDLE_STATS_FILE,
            project_root: workspace_dir.to_path_buf(),
            sourcemap: true,
            emit_file: true,
        }),
    ];

    if options.transforms_modern_syntax() {
        plugins.push(PluginSpec::Replace(ReplaceOptions {
            prevent_assignment: true,
            values: IndexMap::from([
                ("import.meta.env.NODE_ENV", "process.env.NODE_ENV"),
                (
                    "import.meta.env.DEV",
                    r#"process.env.NODE_ENV === "dev" || process.env.NODE_ENV === "development""#,
                ),
            ]),
        }));
        plugins.push(PluginSpec::CommonJs);
        plugins.push(PluginSpec::Babel(BabelOptions {
            babelrc: false,
            extensions: vec![".ts", ".tsx", ".js", ".jsx", ".mjs"],
            babel_helpers: "bundled",
            browserslist_env: browserslist_env(options.build_type),
            presets: vec!["@babel/preset-env"],
            plugins: vec!["@babel/plugin-proposal-explicit-resource-management"],
            cwd: package_dir.to_path_buf(),
            import_attributes_keyword: "with",
        }));
    }

    plugins.push(PluginSpec::BuildChecksum {
        input: entry.to_string(),
    });
    plugins
}

/// `tsconfig.<entry>.json` when present, else `tsconfig.json`.
fn find_tsconfig<R>(runtime: &R, package_dir: &Path, entry: &str) -> PathBuf
where
    R: Runtime + ?Sized,
{
    let base = entry.rsplit('/').next().unwrap_or(entry);
    let name = base.strip_suffix(".ts").unwrap_or(base);
    let specific = package_dir.join(format!("tsconfig.{name}.json"));
    if runtime.exists(&specific) {
        specific
    } else {
        package_dir.join("tsconfig.json")
    }
}

fn browserslist_env(build_type: BuildType) -> &'static str {
    match build_type {
        BuildType::Debug => "development",
        BuildType::Release => "production",
    }
}
