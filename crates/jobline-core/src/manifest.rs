//! Run manifest: records what a pipeline run fetched and wrote, with blake3 file hashes

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Manifest file name, written next to the run outputs
pub const MANIFEST_FILE: &str = "manifest.json";

/// Hash a file's contents with blake3.
pub fn hash_file(path: &Path) -> io::Result<blake3::Hash> {
    let mut hasher = blake3::Hasher::new();
    hasher.update_mmap(path)?;
    Ok(hasher.finalize())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDigest {
    pub bytes: u64,
    pub blake3: String,
}

impl FileDigest {
    pub fn of(path: &Path) -> io::Result<Self> {
        let bytes = std::fs::metadata(path)?.len();
        let blake3 = hash_file(path)?.to_hex().to_string();
        Ok(Self { bytes, blake3 })
    }
}

/// A page that produced no records, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedPageEntry {
    pub page: u32,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub query: String,
    pub start_page: u32,
    pub num_pages: u32,
    pub pages_ok: u32,
    pub stopped_early: bool,
    pub failed_pages: Vec<FailedPageEntry>,
    pub raw_records: usize,
    pub cleaned_rows: usize,
    pub validated_rows: usize,
    /// Output file name → size and blake3 hash
    pub files: BTreeMap<String, FileDigest>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl RunManifest {
    /// Hash every named output in `dir` that exists.
    pub fn record_files(&mut self, dir: &Path, names: &[&str]) -> Result<()> {
        for name in names {
            let path = dir.join(name);
            if !path.is_file() {
                continue;
            }
            let digest =
                FileDigest::of(&path).with_context(|| format!("failed to hash {}", path.display()))?;
            self.files.insert((*name).to_string(), digest);
        }
        Ok(())
    }

    pub fn write(&self, dir: &Path) -> Result<()> {
        let path = dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json).with_context(|| format!("cannot write {}", path.display()))?;
        Ok(())
    }

    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("invalid {}", path.display()))
    }
}
