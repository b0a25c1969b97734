//! Workspace layout and project directory resolution.

// Workspace discovery runs before any runtime exists (CLI startup)
#![allow(clippy::disallowed_methods)]

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ConfigError, Result};

/// Workspace configuration file of the task runner.
pub const NX_JSON: &str = "nx.json";

/// Default folder holding libraries.
pub const DEFAULT_LIBS_DIR: &str = "libs";

/// `workspaceLayout` block of `nx.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceLayout {
    #[serde(default = "default_libs_dir")]
    pub libs_dir: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apps_dir: Option<String>,
}

fn default_libs_dir() -> String {
    DEFAULT_LIBS_DIR.to_string()
}

impl Default for WorkspaceLayout {
    fn default() -> Self {
        Self {
            libs_dir: default_libs_dir(),
            apps_dir: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NxJson {
    #[serde(default)]
    workspace_layout: Option<WorkspaceLayout>,
}

impl WorkspaceLayout {
    /// Read the layout from `<root>/nx.json`. A missing file or block gives
    /// the default layout.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(NX_JSON);
        if !path.exists() {
            debug!("No {} in {}, using default layout", NX_JSON, root.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let nx: NxJson = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(nx.workspace_layout.unwrap_or_default())
    }
}

/// What the executor knows about the invocation.
///
/// [`ExecutorContext::load`] reads the layout from `nx.json`;
/// [`ExecutorContext::new`] assumes the default `libs/` folder.
#[derive(Debug, Clone)]
pub struct ExecutorContext {
    /// Workspace root.
    pub root: PathBuf,
    /// Name of the project being built.
    pub project_name: Option<String>,
    pub layout: WorkspaceLayout,
}

impl ExecutorContext {
    pub fn new(root: impl Into<PathBuf>, project_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            project_name: Some(project_name.into()),
            layout: WorkspaceLayout::default(),
        }
    }

    /// Context for `project_name` with the layout declared in `<root>/nx.json`.
    pub fn load(root: impl Into<PathBuf>, project_name: impl Into<String>) -> Result<Self> {
        let root = root.into();
        let layout = WorkspaceLayout::load(&root)?;
        Ok(Self::new(root, project_name).with_layout(layout))
    }

    pub fn with_layout(mut self, layout: WorkspaceLayout) -> Self {
        self.layout = layout;
        self
    }

    /// `<root>/<libsDir>/<basename(projectName)>`. Scoped names such as
    /// `@acme/ui` map to `ui`.
    pub fn project_dir(&self) -> Result<PathBuf> {
        let name = self
            .project_name
            .as_deref()
            .and_then(|name| Path::new(name).file_name())
            .ok_or(ConfigError::MissingProjectName)?;
        Ok(self.root.join(&self.layout.libs_dir).join(name))
    }
}
