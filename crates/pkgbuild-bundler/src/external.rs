//! Which imports stay external to a package bundle.

use pkgbuild_core::Manifest;
use rustc_hash::FxHashSet;
use serde::{Serialize, Serializer};

/// Declared dependencies plus the package's own name.
///
/// Dev dependencies are bundled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalPredicate {
    dependencies: FxHashSet<String>,
}

impl ExternalPredicate {
    pub fn from_manifest(manifest: &Manifest) -> Self {
        let mut dependencies: FxHashSet<String> = manifest
            .dependencies
            .keys()
            .chain(manifest.peer_dependencies.keys())
            .chain(manifest.optional_dependencies.keys())
            .cloned()
            .collect();
        if let Some(name) = &manifest.name {
            dependencies.insert(name.clone());
        }
        Self { dependencies }
    }

    /// Decide whether `source` is left as an import.
    pub fn is_external(&self, source: &str, _importer: Option<&str>, is_resolved: bool) -> bool {
        if is_resolved || source.starts_with('.') {
            return false;
        }
        if source.starts_with("node:") || self.dependencies.contains(source) {
            return true;
        }

        let segments = if source.starts_with('@') { 2 } else { 1 };
        let package_name = source
            .split('/')
            .take(segments)
            .collect::<Vec<_>>()
            .join("/");
        self.dependencies.contains(&package_name)
    }

    /// Dependency names, sorted.
    pub fn dependencies(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.dependencies.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Serialize for ExternalPredicate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.dependencies())
    }
}
