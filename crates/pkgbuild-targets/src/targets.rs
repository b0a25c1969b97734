//! Target definitions derived from project tags.

use indexmap::IndexMap;
use pkgbuild_config::{BuildType, TargetOptions};
use pkgbuild_core::Manifest;
use pkgbuild_core::dedupe::dedupe;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Executor of the inferred `build` target.
pub const BUNDLE_EXECUTOR: &str = "pkgbuild:bundle";

/// Tags that produce a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownTag {
    Rollup,
    Vitest,
    Eslint,
    Release,
}

impl KnownTag {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "rollup" => Some(KnownTag::Rollup),
            "vitest" => Some(KnownTag::Vitest),
            "eslint" => Some(KnownTag::Eslint),
            "release" => Some(KnownTag::Release),
            _ => None,
        }
    }

    /// Name of the target the tag creates.
    pub fn target_name(&self) -> &'static str {
        match self {
            KnownTag::Rollup => "build",
            KnownTag::Vitest => "test",
            KnownTag::Eslint => "lint",
            KnownTag::Release => "nx-release-publish",
        }
    }
}

/// One entry of a target's `inputs`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetInput {
    Pattern(String),
    DependentTasksOutputFiles {
        #[serde(rename = "dependentTasksOutputFiles")]
        dependent_tasks_output_files: String,
        transitive: bool,
    },
    Runtime {
        runtime: String,
    },
}

impl TargetInput {
    pub fn pattern(pattern: impl Into<String>) -> Self {
        TargetInput::Pattern(pattern.into())
    }

    /// Checksum files of every transitive dependency's build.
    pub fn dependency_checksums() -> Self {
        TargetInput::DependentTasksOutputFiles {
            dependent_tasks_output_files: "**/*.checksum.txt".to_string(),
            transitive: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetMetadata {
    pub description: String,
    pub technologies: Vec<String>,
}

/// A task-runner target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor: Option<String>,

    #[serde(flatten)]
    pub options: TargetOptions,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<TargetInput>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TargetMetadata>,
}

/// Targets for every known tag of `manifest`, each carrying `fingerprint` as
/// a runtime input. Empty when no tag is known.
pub fn targets_for_manifest(
    manifest: &Manifest,
    fingerprint: &str,
) -> IndexMap<String, TargetConfiguration> {
    let mut targets = IndexMap::new();
    for tag in manifest.tags().iter().filter_map(|tag| KnownTag::parse(tag)) {
        let target = match tag {
            KnownTag::Rollup => build_target(manifest),
            KnownTag::Vitest => test_target(),
            KnownTag::Eslint => lint_target(),
            KnownTag::Release => release_publish_target(),
        };
        targets.insert(tag.target_name().to_string(), target);
    }

    let runtime = TargetInput::Runtime {
        runtime: format!("echo {fingerprint}"),
    };
    for target in targets.values_mut() {
        target.inputs = std::mem::take(&mut target.inputs)
            .into_iter()
            .chain(std::iter::once(runtime.clone()))
            .filter(dedupe())
            .collect();
    }
    targets
}

fn build_target(manifest: &Manifest) -> TargetConfiguration {
    let public = !manifest.private;

    TargetConfiguration {
        executor: Some(BUNDLE_EXECUTOR.to_string()),
        options: TargetOptions {
            options: json!({
                "clean": true,
                "buildType": BuildType::Release,
                "preserveModules": !public,
                "transformModernSyntax": public,
            }),
            configurations: configurations([
                ("development", json!({ "buildType": BuildType::Debug })),
                ("production", json!({ "buildType": BuildType::Release })),
            ]),
            default_configuration: Some("development".to_string()),
        },
        depends_on: vec!["^build".to_string()],
        inputs: vec![
            TargetInput::dependency_checksums(),
            TargetInput::pattern("{projectRoot}/src/**/*"),
            TargetInput::pattern("!{projectRoot}/src/**/*.spec.{ts,tsx}"),
            TargetInput::pattern("{projectRoot}/tsconfig.json"),
        ],
        outputs: vec![
            "{projectRoot}/dist".to_string(),
            "{projectRoot}/reports".to_string(),
        ],
        cache: Some(true),
        metadata: Some(TargetMetadata {
            description: "Builds the project with pkgbuild".to_string(),
            technologies: vec!["rollup".to_string()],
        }),
    }
}

fn test_target() -> TargetConfiguration {
    TargetConfiguration {
        executor: Some("@nx/vite:test".to_string()),
        options: TargetOptions {
            options: json!({
                "reportsDirectory": "../../coverage/{projectRoot}",
                "configFile": "{workspaceRoot}/vitest.config.mts"
            }),
            configurations: configurations([
                ("watch", json!({ "watch": false })),
                ("development", json!({})),
                ("production", json!({})),
            ]),
            default_configuration: Some("development".to_string()),
        },
        depends_on: vec!["^build".to_string()],
        inputs: vec![
            TargetInput::dependency_checksums(),
            TargetInput::pattern("{workspaceRoot}/vitest.config.mts"),
            TargetInput::pattern("{projectRoot}/package.json"),
            TargetInput::pattern("{projectRoot}/src/**/*.{ts,tsx}"),
            TargetInput::pattern("{projectRoot}/test/**/*.{ts,tsx}"),
        ],
        outputs: vec!["{workspaceRoot}/coverage/{projectRoot}".to_string()],
        cache: Some(true),
        metadata: None,
    }
}

fn lint_target() -> TargetConfiguration {
    TargetConfiguration {
        executor: Some("@nx/eslint:lint".to_string()),
        ..TargetConfiguration::default()
    }
}

fn release_publish_target() -> TargetConfiguration {
    TargetConfiguration {
        options: TargetOptions {
            options: json!({ "packageRoot": "{projectRoot}/dist" }),
            ..TargetOptions::default()
        },
        ..TargetConfiguration::default()
    }
}

fn configurations<const N: usize>(entries: [(&str, Value); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}
