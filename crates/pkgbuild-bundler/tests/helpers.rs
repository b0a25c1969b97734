//! Shared test utilities for pkgbuild-bundler tests
//!
//! A recording engine that emits one entry chunk per output, and a temporary
//! workspace laid out the way the executor expects it.

#![allow(dead_code)]

use async_trait::async_trait;
use pkgbuild_bundler::{
    BundleEngine, BundleWarning, EngineError, InputConfig, ModuleBundle, OutputConfig,
    OutputFile, PreRenderedChunk, WarningHandler,
};
use pkgbuild_config::ExecutorContext;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// A workspace with one library under `libs/<name>`.
pub struct Workspace {
    pub dir: TempDir,
    pub name: String,
}

impl Workspace {
    pub fn new(name: &str) -> Self {
        let dir = TempDir::new().expect("tempdir");
        fs::create_dir_all(dir.path().join("libs").join(name)).expect("project dir");
        Self {
            dir,
            name: name.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn project_dir(&self) -> PathBuf {
        self.root().join("libs").join(&self.name)
    }

    /// Write a file relative to the project directory.
    pub fn write(&self, relative: &str, content: &str) -> &Self {
        let path = self.project_dir().join(relative);
        fs::create_dir_all(path.parent().expect("parent")).expect("create dir");
        fs::write(path, content).expect("write file");
        self
    }

    pub fn manifest(&self, manifest: serde_json::Value) -> &Self {
        self.write("package.json", &manifest.to_string())
    }

    pub fn context(&self) -> ExecutorContext {
        ExecutorContext::new(self.root(), format!("@acme/{}", self.name))
    }

    pub fn dist(&self, file: &str) -> PathBuf {
        self.project_dir().join("dist").join(file)
    }

    pub fn read_dist(&self, file: &str) -> String {
        fs::read_to_string(self.dist(file)).expect("dist file")
    }
}

/// Engine double that records every call and emits deterministic output.
#[derive(Default)]
pub struct RecordingEngine {
    pub inputs: Mutex<Vec<InputConfig>>,
    pub generated: Arc<Mutex<Vec<(String, OutputConfig)>>>,
    warnings: Vec<BundleWarning>,
    failure: Option<String>,
    /// Restricts `failure` to one entry. `None` fails every call.
    fail_on: Option<String>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise `warning` while bundling every entry.
    pub fn warning(mut self, code: &str, message: &str) -> Self {
        self.warnings.push(BundleWarning::new(code, message));
        self
    }

    /// Fail every bundle call.
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Fail only when bundling `entry`.
    pub fn failing_on(mut self, entry: &str, message: &str) -> Self {
        self.fail_on = Some(entry.to_string());
        self.failing(message)
    }

    pub fn generated_formats(&self) -> Vec<(String, String)> {
        self.generated
            .lock()
            .expect("lock")
            .iter()
            .map(|(entry, output)| (entry.clone(), output.format.to_string()))
            .collect()
    }

    pub fn bundled_entries(&self) -> Vec<String> {
        self.inputs
            .lock()
            .expect("lock")
            .iter()
            .map(|input| input.entry.clone())
            .collect()
    }
}

#[async_trait]
impl BundleEngine for RecordingEngine {
    async fn bundle(
        &self,
        input: &InputConfig,
        warnings: &dyn WarningHandler,
    ) -> Result<Box<dyn ModuleBundle>, EngineError> {
        self.inputs.lock().expect("lock").push(input.clone());

        if let Some(message) = &self.failure {
            if self.fail_on.as_ref().is_none_or(|entry| *entry == input.entry) {
                return Err(EngineError::new(message.clone()));
            }
        }

        for warning in &self.warnings {
            warnings.handle(warning.clone());
        }

        let name = input
            .input
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("index")
            .to_string();
        Ok(Box::new(RecordedBundle {
            entry: input.entry.clone(),
            name,
            generated: Arc::clone(&self.generated),
        }))
    }
}

/// Output of [`RecordingEngine`]. Generated configs are shared with the engine.
struct RecordedBundle {
    entry: String,
    name: String,
    generated: Arc<Mutex<Vec<(String, OutputConfig)>>>,
}

#[async_trait]
impl ModuleBundle for RecordedBundle {
    async fn generate(
        &self,
        output: &OutputConfig,
        _warnings: &dyn WarningHandler,
    ) -> Result<Vec<OutputFile>, EngineError> {
        self.generated
            .lock()
            .expect("lock")
            .push((self.entry.clone(), output.clone()));

        let file_name = output.chunk_file_name(&PreRenderedChunk::entry(self.name.as_str()));
        let code = format!("// {} as {}\nexport {{}};\n", self.entry, output.format);
        Ok(vec![
            OutputFile::Chunk {
                file_name: file_name.clone(),
                code,
                is_entry: true,
            },
            OutputFile::asset(format!("{file_name}.map"), "{}"),
        ])
    }
}
