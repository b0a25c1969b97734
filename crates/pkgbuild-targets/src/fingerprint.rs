//! Fingerprint of the sources that produce target definitions.
//!
//! The task runner cannot see when the inference code itself changes, so every
//! inferred target carries this fingerprint as a runtime input.

// Fingerprinting walks the plugin sources directly
#![allow(clippy::disallowed_methods)]

use ignore::overrides::{Override, OverrideBuilder};
use once_cell::sync::OnceCell;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Result, TargetsError};

/// Globs fingerprinted when none are given.
pub const DEFAULT_SOURCE_GLOBS: &[&str] = &["**/*.rs", "**/*.toml", "!**/tests/**"];

/// Lazily computed, then cached for the lifetime of the value.
#[derive(Debug)]
pub struct SourceFingerprint {
    source: Source,
    value: OnceCell<String>,
}

#[derive(Debug)]
enum Source {
    Files { root: PathBuf, globs: Vec<String> },
    Fixed,
}

impl SourceFingerprint {
    /// Hash files under `root` matching `globs` (`!` excludes).
    pub fn from_sources<I, S>(root: impl Into<PathBuf>, globs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: Source::Files {
                root: root.into(),
                globs: globs.into_iter().map(Into::into).collect(),
            },
            value: OnceCell::new(),
        }
    }

    /// Fingerprint `root` with [`DEFAULT_SOURCE_GLOBS`].
    pub fn with_default_globs(root: impl Into<PathBuf>) -> Self {
        Self::from_sources(root, DEFAULT_SOURCE_GLOBS.iter().copied())
    }

    /// A pinned value. Nothing is read.
    pub fn fixed(value: impl Into<String>) -> Self {
        Self {
            source: Source::Fixed,
            value: OnceCell::with_value(value.into()),
        }
    }

    pub fn value(&self) -> Result<&str> {
        self.value
            .get_or_try_init(|| match &self.source {
                Source::Files { root, globs } => compute(root, globs),
                // initialized at construction
                Source::Fixed => Ok(String::new()),
            })
            .map(String::as_str)
    }
}

fn compute(root: &Path, globs: &[String]) -> Result<String> {
    let matcher = build_matcher(root, globs)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_entry(|e| {
        e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.')
    }) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        if matcher.matched(relative, false).is_whitelist() {
            files.push(relative.to_path_buf());
        }
    }
    files.sort();

    let mut hasher = Sha256::new();
    for relative in &files {
        let content = fs::read(root.join(relative))?;
        hasher.update(relative.to_string_lossy().replace('\\', "/").as_bytes());
        hasher.update([0u8]);
        hasher.update(&content);
        hasher.update([0u8]);
    }

    debug!("Fingerprinted {} files under {}", files.len(), root.display());
    Ok(format!("{:x}", hasher.finalize()))
}

fn build_matcher(root: &Path, globs: &[String]) -> Result<Override> {
    let mut builder = OverrideBuilder::new(root);
    for glob in globs {
        builder.add(glob).map_err(|e| TargetsError::Pattern {
            pattern: glob.clone(),
            reason: e.to_string(),
        })?;
    }
    builder.build().map_err(|e| TargetsError::Pattern {
        pattern: globs.join(", "),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn sources() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Cargo.toml", "[package]\nname = \"plugin\"\n");
        write(dir.path(), "src/lib.rs", "pub fn targets() {}\n");
        write(dir.path(), "tests/infer.rs", "#[test] fn t() {}\n");
        write(dir.path(), "README.md", "# plugin\n");
        dir
    }

    #[test]
    fn test_fixed_value() {
        let fingerprint = SourceFingerprint::fixed("abc123");
        assert_eq!(fingerprint.value().unwrap(), "abc123");
    }

    #[test]
    fn test_stable_across_instances() {
        let dir = sources();
        let first = SourceFingerprint::with_default_globs(dir.path());
        let second = SourceFingerprint::with_default_globs(dir.path());
        assert_eq!(first.value().unwrap(), second.value().unwrap());
        assert_eq!(first.value().unwrap().len(), 64);
    }

    #[test]
    fn test_tracks_matching_sources() {
        let dir = sources();
        let before = SourceFingerprint::with_default_globs(dir.path())
            .value()
            .unwrap()
            .to_string();

        write(dir.path(), "src/lib.rs", "pub fn targets() -> u8 { 1 }\n");
        let after = SourceFingerprint::with_default_globs(dir.path())
            .value()
            .unwrap()
            .to_string();
        assert_ne!(before, after);
    }

    #[test]
    fn test_ignores_excluded_files() {
        let dir = sources();
        let before = SourceFingerprint::with_default_globs(dir.path())
            .value()
            .unwrap()
            .to_string();

        write(dir.path(), "tests/infer.rs", "// changed\n");
        write(dir.path(), "README.md", "# changed\n");
        let after = SourceFingerprint::with_default_globs(dir.path())
            .value()
            .unwrap()
            .to_string();
        assert_eq!(before, after);
    }

    #[test]
    fn test_computed_once() {
        let dir = sources();
        let fingerprint = SourceFingerprint::with_default_globs(dir.path());
        let first = fingerprint.value().unwrap().to_string();

        write(dir.path(), "src/lib.rs", "// changed after first read\n");
        assert_eq!(fingerprint.value().unwrap(), first);
    }

    #[test]
    fn test_invalid_glob() {
        let dir = sources();
        let fingerprint = SourceFingerprint::from_sources(dir.path(), ["src/[.rs"]);
        assert!(matches!(
            fingerprint.value(),
            Err(TargetsError::Pattern { .. })
        ));
    }
}
