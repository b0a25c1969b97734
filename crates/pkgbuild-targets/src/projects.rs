//! Workspace discovery: every `package.json` with known tags becomes a project.

// Discovery reads manifests synchronously while walking the workspace
#![allow(clippy::disallowed_methods)]

use indexmap::IndexMap;
use pkgbuild_core::{Manifest, PACKAGE_JSON, ProjectMetadata};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::error::{Result, TargetsError};
use crate::fingerprint::SourceFingerprint;
use crate::targets::{KnownTag, TargetConfiguration, targets_for_manifest};

/// Project configuration file merged over the manifest's `nx` block.
pub const PROJECT_JSON: &str = "project.json";

/// Directories never searched for manifests.
const SKIPPED_DIRS: &[&str] = &["node_modules", "dist"];

/// A project with at least one inferred target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferredProject {
    pub name: String,
    pub targets: IndexMap<String, TargetConfiguration>,
}

/// Infer targets for every tagged package under `root`, keyed by project
/// root relative to `root`.
pub fn infer_projects(
    root: &Path,
    fingerprint: &SourceFingerprint,
) -> Result<BTreeMap<String, InferredProject>> {
    let mut projects = BTreeMap::new();

    for entry in WalkDir::new(root).into_iter().filter_entry(is_searched) {
        let entry = entry?;
        if !entry.file_type().is_file() || entry.file_name() != PACKAGE_JSON {
            continue;
        }

        let manifest = load_project_manifest(entry.path())?;
        if !manifest.tags().iter().any(|tag| KnownTag::parse(tag).is_some()) {
            continue;
        }

        let project_root = project_root(root, entry.path());
        let targets = targets_for_manifest(&manifest, fingerprint.value()?);
        debug!("Inferred {} targets for {project_root}", targets.len());

        let name = manifest.name.clone().unwrap_or_else(|| project_root.clone());
        projects.insert(project_root, InferredProject { name, targets });
    }

    Ok(projects)
}

/// Read a manifest and merge a sibling `project.json` over its `nx` block.
///
/// Keys of `project.json` replace those of the `nx` block wholesale.
pub fn load_project_manifest(path: &Path) -> Result<Manifest> {
    let content = fs::read_to_string(path)?;
    let mut manifest = Manifest::parse(path, &content)?;

    let project_json = path.with_file_name(PROJECT_JSON);
    if !project_json.exists() {
        return Ok(manifest);
    }

    let invalid = |reason: String| TargetsError::ProjectJson {
        path: project_json.clone(),
        reason,
    };
    let overrides: Value =
        serde_json::from_str(&fs::read_to_string(&project_json)?).map_err(|e| invalid(e.to_string()))?;
    let Value::Object(overrides) = overrides else {
        return Err(invalid("expected an object".to_string()));
    };

    let mut nx = match manifest.nx.take() {
        Some(nx) => serde_json::to_value(nx).map_err(|e| invalid(e.to_string()))?,
        None => Value::Object(Default::default()),
    };
    if let Value::Object(nx) = &mut nx {
        nx.extend(overrides);
    }
    manifest.nx = Some(
        serde_json::from_value::<ProjectMetadata>(nx).map_err(|e| invalid(e.to_string()))?,
    );
    Ok(manifest)
}

fn is_searched(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    !name.starts_with('.') && !SKIPPED_DIRS.contains(&&*name)
}

fn project_root(root: &Path, manifest: &Path) -> String {
    let dir = manifest.parent().unwrap_or(root);
    let relative = dir.strip_prefix(root).unwrap_or(dir);
    let relative = relative.to_string_lossy().replace('\\', "/");
    if relative.is_empty() {
        ".".to_string()
    } else {
        relative
    }
}
