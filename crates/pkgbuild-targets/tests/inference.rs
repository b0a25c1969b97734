//! Workspace-wide target inference over a temporary monorepo.

use pkgbuild_targets::{SourceFingerprint, TargetInput, TargetsError, infer_projects};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn monorepo() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "package.json", r#"{ "name": "acme", "private": true }"#);
    write(
        root,
        "libs/ui/package.json",
        &json!({ "name": "@acme/ui", "nx": { "tags": ["rollup", "vitest"] } }).to_string(),
    );
    write(
        root,
        "libs/internal/package.json",
        &json!({ "name": "@acme/internal", "private": true, "nx": { "tags": ["rollup"] } })
            .to_string(),
    );
    write(root, "libs/docs/package.json", r#"{ "name": "@acme/docs" }"#);
    write(root, "libs/docs/project.json", r#"{ "tags": ["eslint"] }"#);
    // never searched
    write(
        root,
        "node_modules/left-pad/package.json",
        r#"{ "name": "left-pad", "nx": { "tags": ["rollup"] } }"#,
    );
    write(
        root,
        "libs/ui/dist/package.json",
        r#"{ "name": "@acme/ui", "nx": { "tags": ["rollup"] } }"#,
    );
    write(
        root,
        ".cache/package.json",
        r#"{ "name": "cached", "nx": { "tags": ["rollup"] } }"#,
    );
    dir
}

#[test]
fn infers_tagged_projects_only() {
    let dir = monorepo();
    let projects = infer_projects(dir.path(), &SourceFingerprint::fixed("f00d")).unwrap();

    assert_eq!(
        projects.keys().collect::<Vec<_>>(),
        ["libs/docs", "libs/internal", "libs/ui"]
    );
    assert_eq!(projects["libs/ui"].name, "@acme/ui");
    assert_eq!(
        projects["libs/ui"].targets.keys().collect::<Vec<_>>(),
        ["build", "test"]
    );
    assert_eq!(
        projects["libs/docs"].targets.keys().collect::<Vec<_>>(),
        ["lint"]
    );
}

#[test]
fn build_options_follow_privacy() {
    let dir = monorepo();
    let projects = infer_projects(dir.path(), &SourceFingerprint::fixed("f00d")).unwrap();

    let public = &projects["libs/ui"].targets["build"].options.options;
    assert_eq!(public["preserveModules"], false);
    assert_eq!(public["transformModernSyntax"], true);

    let private = &projects["libs/internal"].targets["build"].options.options;
    assert_eq!(private["preserveModules"], true);
    assert_eq!(private["transformModernSyntax"], false);
}

#[test]
fn every_target_carries_the_fingerprint() {
    let dir = monorepo();
    let projects = infer_projects(dir.path(), &SourceFingerprint::fixed("f00d")).unwrap();

    let runtime = TargetInput::Runtime {
        runtime: "echo f00d".to_string(),
    };
    for project in projects.values() {
        for target in project.targets.values() {
            assert_eq!(
                target.inputs.iter().filter(|input| **input == runtime).count(),
                1
            );
        }
    }
}

#[test]
fn untagged_workspace_never_reads_sources() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "libs/a/package.json", r#"{ "name": "a" }"#);

    // an invalid glob would fail if the fingerprint were computed
    let fingerprint = SourceFingerprint::from_sources(dir.path(), ["src/[.rs"]);
    assert!(infer_projects(dir.path(), &fingerprint).unwrap().is_empty());
}

#[test]
fn invalid_manifest_fails() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "libs/a/package.json", "{ not json");

    let err = infer_projects(dir.path(), &SourceFingerprint::fixed("f00d")).unwrap_err();
    assert!(matches!(err, TargetsError::Manifest(_)));
}

#[test]
fn inferred_projects_serialize_as_target_json() {
    let dir = monorepo();
    let projects = infer_projects(dir.path(), &SourceFingerprint::fixed("f00d")).unwrap();

    let value = serde_json::to_value(&projects["libs/ui"]).unwrap();
    let build = &value["targets"]["build"];
    assert_eq!(build["executor"], "pkgbuild:bundle");
    assert_eq!(build["dependsOn"], json!(["^build"]));
    assert_eq!(build["defaultConfiguration"], "development");
    assert_eq!(build["configurations"]["production"]["buildType"], "release");
    assert_eq!(
        build["inputs"][0],
        json!({ "dependentTasksOutputFiles": "**/*.checksum.txt", "transitive": true })
    );
}
