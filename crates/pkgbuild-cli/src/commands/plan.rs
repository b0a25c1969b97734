//! `pkgbuild plan <project-dir>`
//!
//! Resolves options and bundle plans exactly like the executor does, without
//! invoking an engine.

// Walks up from the project directory before any runtime exists
#![allow(clippy::disallowed_methods)]

use pkgbuild_bundler::{
    BundlePlan, ExternalPredicate, ModuleFormat, PreRenderedChunk, create_bundle_plans,
};
use pkgbuild_config::{
    BuildType, ConfigError, ExecutorOptions, MANIFEST_FIELD, NX_JSON, OPTIONS_FILE, OptionOverrides,
    OptionsLoader,
};
use pkgbuild_core::{NativeRuntime, PACKAGE_JSON, infer_build_map, read_package_json};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cli::PlanArgs;
use crate::commands::utils::print_json;
use crate::error::{CliError, Result, ResultExt};

pub async fn execute(args: PlanArgs) -> Result<()> {
    let project_dir = std::path::absolute(&args.project_dir).with_path(&args.project_dir)?;
    if !project_dir.is_dir() {
        return Err(CliError::FileNotFound(project_dir));
    }

    let options = load_options(&project_dir, &args)?;
    debug!("Resolved options: {options:?}");

    let runtime = NativeRuntime::new();
    let manifest_relative = options
        .package_json_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(PACKAGE_JSON));
    let manifest_path = project_dir.join(&manifest_relative);
    let manifest = read_package_json(&runtime, &manifest_path)
        .await
        .with_path(&manifest_path)?;
    let manifest_dir = manifest_relative.parent().unwrap_or(Path::new(""));

    let build_map = infer_build_map(&runtime, &project_dir, manifest_dir, &manifest)?;
    let workspace_dir = workspace_root(&project_dir);
    let plans = create_bundle_plans(
        &runtime,
        &workspace_dir,
        &project_dir,
        &manifest,
        &build_map,
        &options,
    );
    if plans.is_empty() {
        return Err(pkgbuild_bundler::Error::NoEntries.into());
    }

    print_json(&PlanReport::new(&options, &plans))
}

fn load_options(project_dir: &Path, args: &PlanArgs) -> Result<ExecutorOptions> {
    let overrides = OptionOverrides {
        preserve_modules: args.preserve_modules.then_some(true),
        transform_modern_syntax: args.transform_modern_syntax.then_some(true),
        package_json_path: args.package_json_path.clone(),
        ..OptionOverrides::default()
    };

    let mut loader = OptionsLoader::new(project_dir).overrides(overrides);
    if let Some(name) = &args.configuration {
        loader = loader.configuration(name.clone());
    }

    let options = loader.load();
    if matches!(options, Err(ConfigError::UnknownConfiguration { .. })) {
        return options.with_hint(format!(
            "Declare it as [configurations.<name>] in {OPTIONS_FILE} or under \"{MANIFEST_FIELD}\" in {PACKAGE_JSON}"
        ));
    }
    Ok(options?)
}

/// Closest ancestor holding `nx.json`, or the project directory itself.
fn workspace_root(project_dir: &Path) -> PathBuf {
    project_dir
        .ancestors()
        .find(|dir| dir.join(NX_JSON).is_file())
        .unwrap_or(project_dir)
        .to_path_buf()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanReport<'a> {
    build_type: BuildType,
    preserve_modules: bool,
    transform_modern_syntax: bool,
    entries: Vec<EntryReport<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EntryReport<'a> {
    entry: &'a str,
    input: &'a Path,
    plugins: Vec<&'static str>,
    external: &'a ExternalPredicate,
    outputs: Vec<OutputReport<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutputReport<'a> {
    format: ModuleFormat,
    dir: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<&'a str>,
    entry_file_name: String,
}

impl<'a> PlanReport<'a> {
    fn new(options: &ExecutorOptions, plans: &'a [BundlePlan]) -> Self {
        Self {
            build_type: options.build_type,
            preserve_modules: options.preserves_modules(),
            transform_modern_syntax: options.transforms_modern_syntax(),
            entries: plans.iter().map(EntryReport::new).collect(),
        }
    }
}

impl<'a> EntryReport<'a> {
    fn new(plan: &'a BundlePlan) -> Self {
        let name = Path::new(&plan.input.entry)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            entry: &plan.input.entry,
            input: &plan.input.input,
            plugins: plan.input.plugin_names(),
            external: &plan.input.external,
            outputs: plan
                .outputs
                .iter()
                .map(|output| OutputReport {
                    format: output.format,
                    dir: &output.dir,
                    file: output.file.as_deref(),
                    entry_file_name: output.chunk_file_name(&PreRenderedChunk::entry(name.as_str())),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_workspace_root_finds_nx_json() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("libs").join("ui");
        fs::create_dir_all(&project).unwrap();
        fs::write(dir.path().join("nx.json"), "{}").unwrap();

        assert_eq!(workspace_root(&project), dir.path());
    }

    #[test]
    fn test_workspace_root_falls_back_to_project() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("ui");
        fs::create_dir_all(&project).unwrap();

        assert_eq!(workspace_root(&project), project);
    }
}
