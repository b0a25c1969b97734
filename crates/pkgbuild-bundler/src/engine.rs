//! The seam to the module bundler.
//!
//! Module resolution, transforms and tree-shaking belong to the engine. The
//! executor only hands it an [`InputConfig`], asks the resulting bundle to
//! generate each [`OutputConfig`], and writes what comes back.

use async_trait::async_trait;
use std::fmt;

use crate::output::OutputConfig;
use crate::plan::InputConfig;

/// Warning code the executor never reports.
pub const EMPTY_BUNDLE: &str = "EMPTY_BUNDLE";

/// A non-fatal diagnostic raised while bundling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleWarning {
    pub code: Option<String>,
    pub message: String,
}

impl BundleWarning {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    pub fn is_empty_bundle(&self) -> bool {
        self.code.as_deref() == Some(EMPTY_BUNDLE)
    }
}

impl fmt::Display for BundleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "({code}) {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Receives warnings as the engine raises them.
pub trait WarningHandler: Send + Sync {
    fn handle(&self, warning: BundleWarning);
}

/// A fatal engine failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct EngineError {
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One emitted file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFile {
    Chunk {
        file_name: String,
        code: String,
        is_entry: bool,
    },
    Asset {
        file_name: String,
        source: Vec<u8>,
    },
}

impl OutputFile {
    pub fn asset(file_name: impl Into<String>, source: impl Into<Vec<u8>>) -> Self {
        OutputFile::Asset {
            file_name: file_name.into(),
            source: source.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        match self {
            OutputFile::Chunk { file_name, .. } | OutputFile::Asset { file_name, .. } => file_name,
        }
    }

    pub fn content(&self) -> &[u8] {
        match self {
            OutputFile::Chunk { code, .. } => code.as_bytes(),
            OutputFile::Asset { source, .. } => source,
        }
    }
}

/// Builds the module graph for one entry.
#[async_trait]
pub trait BundleEngine: Send + Sync {
    async fn bundle(
        &self,
        input: &InputConfig,
        warnings: &dyn WarningHandler,
    ) -> Result<Box<dyn ModuleBundle>, EngineError>;
}

/// A bundled graph that can be rendered in several formats.
#[async_trait]
pub trait ModuleBundle: Send + Sync {
    async fn generate(
        &self,
        output: &OutputConfig,
        warnings: &dyn WarningHandler,
    ) -> Result<Vec<OutputFile>, EngineError>;
}

/// Post-processes the files of one generated output before they are written.
pub trait OutputPlugin: Send + Sync {
    fn name(&self) -> &'static str;

    fn generate_bundle(
        &self,
        output: &OutputConfig,
        files: &mut Vec<OutputFile>,
    ) -> Result<(), EngineError>;
}
