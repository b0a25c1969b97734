//! Content checksum emitted next to every ESM build.
//!
//! Downstream tasks list `**/*.checksum.txt` of their dependencies as inputs,
//! so a dependency rebuild that changes nothing leaves their cache valid.

use sha2::{Digest, Sha256};

use crate::engine::{EngineError, OutputFile, OutputPlugin};
use crate::output::{ModuleFormat, OutputConfig};

pub const CHECKSUM_SUFFIX: &str = ".checksum.txt";

/// Hashes every emitted file, in emission order, into
/// `<basename(input, ".ts")>.checksum.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildChecksum {
    input: String,
}

impl BuildChecksum {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }

    pub fn file_name(&self) -> String {
        let base = self.input.rsplit(['/', '\\']).next().unwrap_or_default();
        let stem = base.strip_suffix(".ts").filter(|stem| !stem.is_empty());
        format!("{}{CHECKSUM_SUFFIX}", stem.unwrap_or(base))
    }
}

/// Lowercase hex SHA-256 over the files' contents.
pub fn checksum(files: &[OutputFile]) -> String {
    let digest = files
        .iter()
        .fold(Sha256::new(), |mut hasher, file| {
            hasher.update(file.content());
            hasher
        })
        .finalize();
    format!("{digest:x}")
}

impl OutputPlugin for BuildChecksum {
    fn name(&self) -> &'static str {
        "build-checksum"
    }

    fn generate_bundle(
        &self,
        output: &OutputConfig,
        files: &mut Vec<OutputFile>,
    ) -> Result<(), EngineError> {
        if output.format != ModuleFormat::Esm {
            return Ok(());
        }

        let digest = checksum(files);
        files.push(OutputFile::asset(self.file_name(), format!("{digest}\n")));
        Ok(())
    }
}
