//! The Build Map: synthesized source entries and the outputs each one feeds.

use indexmap::IndexMap;
use path_clean::PathClean;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::dedupe::dedupe_by;

/// Output format of a descriptor. `Auto` defers to the manifest `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorFormat {
    CommonJs,
    Esm,
    Auto,
}

impl DescriptorFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DescriptorFormat::CommonJs => "commonjs",
            DescriptorFormat::Esm => "esm",
            DescriptorFormat::Auto => "auto",
        }
    }
}

impl fmt::Display for DescriptorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One output an entry point is built into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputDescriptor {
    #[serde(rename = "type")]
    pub format: DescriptorFormat,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl OutputDescriptor {
    pub fn new(format: DescriptorFormat, file: impl Into<String>) -> Self {
        Self {
            format,
            file: Some(file.into()),
        }
    }

    /// Key used to drop duplicate outputs of one entry.
    pub fn dedupe_key(&self) -> String {
        format!("{}:{}", self.file.as_deref().unwrap_or_default(), self.format)
    }
}

/// Ordered map from a source entry (`src/<name>.ts`) to its outputs.
///
/// Every operation returns a new map. Lists are deduplicated by
/// [`OutputDescriptor::dedupe_key`] and empty lists never survive a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildMap(IndexMap<String, Vec<OutputDescriptor>>);

impl BuildMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A map holding a single entry with a single output.
    pub fn single(entry: impl Into<String>, descriptor: OutputDescriptor) -> Self {
        let mut map = IndexMap::with_capacity(1);
        map.insert(entry.into(), vec![descriptor]);
        Self(map)
    }

    /// Combine two maps. Keys keep first-seen order and lists are concatenated
    /// before deduplication.
    pub fn merge(&self, other: &BuildMap) -> BuildMap {
        let mut merged: IndexMap<String, Vec<OutputDescriptor>> = self.0.clone();
        for (entry, outputs) in &other.0 {
            merged
                .entry(entry.clone())
                .or_default()
                .extend(outputs.iter().cloned());
        }

        merged
            .into_iter()
            .filter_map(|(entry, outputs)| {
                let outputs: Vec<OutputDescriptor> = outputs
                    .into_iter()
                    .filter(dedupe_by(OutputDescriptor::dedupe_key))
                    .collect();
                (!outputs.is_empty()).then_some((entry, outputs))
            })
            .collect()
    }

    /// Re-root every entry and output file under `dir`, the manifest's
    /// directory relative to the package.
    pub fn relocate(&self, dir: &Path) -> BuildMap {
        self.0
            .iter()
            .map(|(entry, outputs)| {
                let outputs = outputs
                    .iter()
                    .map(|output| OutputDescriptor {
                        format: output.format,
                        file: output.file.as_deref().map(|file| join_posix(dir, file)),
                    })
                    .collect();
                (join_posix(dir, entry), outputs)
            })
            .collect()
    }

    /// Keep only entries accepted by `keep`.
    pub fn retain_entries(&self, mut keep: impl FnMut(&str) -> bool) -> BuildMap {
        self.0
            .iter()
            .filter(|(entry, _)| keep(entry))
            .map(|(entry, outputs)| (entry.clone(), outputs.clone()))
            .collect()
    }

    pub fn get(&self, entry: &str) -> Option<&[OutputDescriptor]> {
        self.0.get(entry).map(Vec::as_slice)
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[OutputDescriptor])> {
        self.0
            .iter()
            .map(|(entry, outputs)| (entry.as_str(), outputs.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Vec<OutputDescriptor>)> for BuildMap {
    fn from_iter<I: IntoIterator<Item = (String, Vec<OutputDescriptor>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for BuildMap {
    type Item = (String, Vec<OutputDescriptor>);
    type IntoIter = indexmap::map::IntoIter<String, Vec<OutputDescriptor>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Join and normalize with forward slashes, dropping `./` segments.
pub(crate) fn join_posix(base: &Path, path: &str) -> String {
    base.join(path)
        .clean()
        .to_string_lossy()
        .replace('\\', "/")
}
