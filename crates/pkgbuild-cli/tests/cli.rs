//! End-to-end tests of the `pkgbuild` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn pkgbuild() -> Command {
    let mut cmd = Command::cargo_bin("pkgbuild").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("PKGBUILD_BUILD_TYPE")
        .env_remove("PKGBUILD_CLEAN")
        .arg("--no-color");
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

/// `nx.json` plus `libs/ui` with two published entries.
fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "nx.json", "{}");
    write(
        dir.path(),
        "libs/ui/package.json",
        &json!({
            "name": "@acme/ui",
            "exports": {
                ".": { "require": "./dist/index.cjs", "import": "./dist/index.mjs" },
                "./cli": { "import": "./dist/cli.mjs" }
            },
            "dependencies": { "react": "^19.0.0" },
            "nx": { "tags": ["rollup", "release"] }
        })
        .to_string(),
    );
    write(dir.path(), "libs/ui/src/index.ts", "export const a = 1;");
    write(dir.path(), "libs/ui/src/cli.ts", "export const b = 2;");
    dir
}

#[test]
fn help_lists_commands() {
    pkgbuild()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("infer"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("targets"));
}

#[test]
fn verbose_and_quiet_conflict() {
    pkgbuild()
        .args(["--verbose", "--quiet", "targets"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn infer_prints_build_map() {
    let dir = workspace();
    let map = stdout_json(pkgbuild().arg("infer").arg(dir.path().join("libs/ui/package.json")));

    assert_eq!(
        map,
        json!({
            "src/index.ts": [
                { "type": "commonjs", "file": "dist/index.cjs" },
                { "type": "esm", "file": "dist/index.mjs" }
            ],
            "src/cli.ts": [{ "type": "esm", "file": "dist/cli.mjs" }]
        })
    );
}

#[test]
fn infer_rejects_other_file_names() {
    let dir = workspace();
    write(dir.path(), "libs/ui/manifest.json", "{}");

    pkgbuild()
        .arg("infer")
        .arg(dir.path().join("libs/ui/manifest.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Expected package.json file"));
}

#[test]
fn infer_reports_invalid_exports() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "package.json",
        r#"{ "name": "a", "exports": { ".": { "import": { ".": "./dist/index.mjs" } } } }"#,
    );

    pkgbuild()
        .arg("infer")
        .arg(dir.path().join("package.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("pkgbuild::invalid_exports"));
}

#[test]
fn plan_shows_pipeline_and_outputs() {
    let dir = workspace();
    let plan = stdout_json(pkgbuild().arg("plan").arg(dir.path().join("libs/ui")));

    assert_eq!(plan["buildType"], "release");
    let entries = plan["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["entry"], "src/index.ts");
    assert_eq!(
        entries[0]["plugins"],
        json!(["json", "node-resolve", "typescript", "visualizer", "build-checksum"])
    );
    assert_eq!(entries[0]["outputs"][0]["format"], "commonjs");
    assert_eq!(entries[0]["outputs"][0]["entryFileName"], "index.cjs");
    assert_eq!(entries[0]["outputs"][1]["entryFileName"], "index.mjs");
    assert_eq!(entries[1]["outputs"][0]["entryFileName"], "cli.mjs");
    assert_eq!(entries[0]["external"], json!(["@acme/ui", "react"]));
}

#[test]
fn plan_flags_extend_pipeline() {
    let dir = workspace();
    let plan = stdout_json(
        pkgbuild()
            .arg("plan")
            .arg(dir.path().join("libs/ui"))
            .args(["--preserve-modules", "--transform-modern-syntax"]),
    );

    assert_eq!(plan["preserveModules"], true);
    assert_eq!(plan["transformModernSyntax"], true);
    let plugins = plan["entries"][0]["plugins"].as_array().unwrap();
    assert_eq!(
        plugins[4..],
        [json!("replace"), json!("commonjs"), json!("babel"), json!("build-checksum")]
    );
}

#[test]
fn plan_applies_named_configuration() {
    let dir = workspace();
    write(
        dir.path(),
        "libs/ui/pkgbuild.toml",
        "[configurations.development]\nbuildType = \"debug\"\n",
    );

    let plan = stdout_json(
        pkgbuild()
            .arg("plan")
            .arg(dir.path().join("libs/ui"))
            .args(["--configuration", "development"]),
    );
    assert_eq!(plan["buildType"], "debug");
}

#[test]
fn plan_rejects_unknown_configuration() {
    let dir = workspace();

    pkgbuild()
        .arg("plan")
        .arg(dir.path().join("libs/ui"))
        .args(["--configuration", "staging"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown configuration 'staging'"))
        .stderr(predicate::str::contains("Hint: Declare it as [configurations.<name>]"));
}

#[test]
fn plan_without_sources_fails() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "package.json", r#"{ "name": "a", "main": "dist/index.js" }"#);

    pkgbuild()
        .arg("plan")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Expected at least one config"));
}

#[test]
fn targets_prints_inferred_projects() {
    let dir = workspace();
    let projects = stdout_json(pkgbuild().arg("targets").arg(dir.path()));

    let ui = &projects["libs/ui"];
    assert_eq!(ui["name"], "@acme/ui");
    assert_eq!(ui["targets"]["build"]["executor"], "pkgbuild:bundle");
    assert_eq!(
        ui["targets"]["nx-release-publish"]["options"]["packageRoot"],
        "{projectRoot}/dist"
    );
    let runtime = format!("echo {}", env!("CARGO_PKG_VERSION"));
    assert!(
        ui["targets"]["build"]["inputs"]
            .as_array()
            .unwrap()
            .contains(&json!({ "runtime": runtime }))
    );
}

#[test]
fn targets_with_missing_root_fails() {
    let dir = TempDir::new().unwrap();

    pkgbuild()
        .arg("targets")
        .arg(dir.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}
