//! `package.json` model and reader.
//!
//! Only the fields that drive build inference are typed. Everything else is
//! kept in [`Manifest::extra`] so a manifest can be read and re-serialized
//! without losing data.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ffi::OsStr;
use std::path::Path;

use crate::runtime::Runtime;
use crate::{Error, Result};

/// File name every manifest must carry.
pub const PACKAGE_JSON: &str = "package.json";

/// Module system declared by the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    Module,
    CommonJs,
}

/// Parsed package.json structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub package_type: Option<PackageType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    /// Raw `exports` field. Parsed into [`crate::exports::Exports`] by the
    /// resolver so that an odd shape only fails the build, not every reader.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exports: Option<Value>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub private: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_config: Option<PublishConfig>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub dependencies: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub dev_dependencies: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub peer_dependencies: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub optional_dependencies: IndexMap<String, String>,

    /// Project metadata for the task runner (`tags`, explicit `targets`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nx: Option<ProjectMetadata>,

    /// Fields the core does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Overrides applied when the package is published.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublishConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `nx` block of a manifest, or the contents of a sibling `project.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub targets: Map<String, Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Manifest {
    /// Parse manifest JSON. `path` is only used for error messages.
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::InvalidManifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// `true` when `"type": "module"` is declared.
    pub fn is_module(&self) -> bool {
        self.package_type == Some(PackageType::Module)
    }

    /// `main`, preferring `publishConfig.main`.
    pub fn main_entry(&self) -> Option<&str> {
        self.publish_config
            .as_ref()
            .and_then(|c| c.main.as_deref())
            .or(self.main.as_deref())
    }

    /// `module`, preferring `publishConfig.module`.
    pub fn module_entry(&self) -> Option<&str> {
        self.publish_config
            .as_ref()
            .and_then(|c| c.module.as_deref())
            .or(self.module.as_deref())
    }

    /// Tags declared in the `nx` block.
    pub fn tags(&self) -> &[String] {
        self.nx.as_ref().map(|nx| nx.tags.as_slice()).unwrap_or_default()
    }
}

/// Fails unless `path` is literally named `package.json`.
pub fn ensure_package_json(path: &Path) -> Result<()> {
    if path.file_name() == Some(OsStr::new(PACKAGE_JSON)) {
        Ok(())
    } else {
        Err(Error::NotPackageJson(path.to_path_buf()))
    }
}

/// Read and parse a manifest through the runtime.
///
/// # Errors
///
/// - [`Error::NotPackageJson`] when the file is not named `package.json`
/// - [`Error::Runtime`] when the file cannot be read
/// - [`Error::InvalidManifest`] when the content is not a valid manifest
pub async fn read_package_json<R>(runtime: &R, path: &Path) -> Result<Manifest>
where
    R: Runtime + ?Sized,
{
    ensure_package_json(path)?;
    let content = runtime.read_to_string(path).await?;
    Manifest::parse(path, &content)
}
