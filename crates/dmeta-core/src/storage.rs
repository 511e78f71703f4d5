//! Flat-file persistence for the record corpus and its source metadata.
//!
//! The store is deliberately simple: one JSON file holding the full ordered
//! record sequence, rewritten whole on every mutation, plus a sibling file
//! with per-source metadata. There is no partial write and no locking; the
//! last writer wins.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{DocBlock, SourceMeta};

const CORPUS_FILE: &str = "corpus.json";
const SOURCES_FILE: &str = "sources.json";

/// Local filesystem store for the assembled corpus.
pub struct Storage {
    root_dir: PathBuf,
}

impl Storage {
    /// Creates a store rooted at the default data directory.
    ///
    /// `DMETA_DATA_DIR` overrides the platform location explicitly, which is
    /// what the tests use.
    pub fn new() -> Result<Self> {
        if let Ok(dir) = std::env::var("DMETA_DATA_DIR") {
            let trimmed = dir.trim();
            if !trimmed.is_empty() {
                return Self::with_root(PathBuf::from(trimmed));
            }
        }

        let dirs = ProjectDirs::from("dev", "dmeta", "dmeta")
            .ok_or_else(|| Error::Storage("Failed to determine data directory".into()))?;
        Self::with_root(dirs.data_dir().to_path_buf())
    }

    /// Creates a store rooted at an explicit directory.
    pub fn with_root(root_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root_dir)
            .map_err(|e| Error::Storage(format!("Failed to create data directory: {e}")))?;
        Ok(Self { root_dir })
    }

    /// Returns the root data directory path.
    #[must_use]
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Path of the corpus file.
    #[must_use]
    pub fn corpus_path(&self) -> PathBuf {
        self.root_dir.join(CORPUS_FILE)
    }

    /// Path of the source-metadata file.
    #[must_use]
    pub fn sources_path(&self) -> PathBuf {
        self.root_dir.join(SOURCES_FILE)
    }

    /// Loads the persisted corpus, or an empty sequence if none exists yet.
    pub fn load_corpus(&self) -> Result<Vec<DocBlock>> {
        let path = self.corpus_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(&path)
            .map_err(|e| Error::Storage(format!("Failed to read corpus: {e}")))?;
        let records = serde_json::from_str(&json)
            .map_err(|e| Error::Storage(format!("Failed to parse corpus: {e}")))?;
        Ok(records)
    }

    /// Rewrites the whole corpus file.
    pub fn save_corpus(&self, records: &[DocBlock]) -> Result<()> {
        self.write_json(&self.corpus_path(), records)?;
        debug!("Saved {} records to {}", records.len(), CORPUS_FILE);
        Ok(())
    }

    /// Loads persisted source metadata, or an empty sequence.
    pub fn load_sources(&self) -> Result<Vec<SourceMeta>> {
        let path = self.sources_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(&path)
            .map_err(|e| Error::Storage(format!("Failed to read sources: {e}")))?;
        let sources = serde_json::from_str(&json)
            .map_err(|e| Error::Storage(format!("Failed to parse sources: {e}")))?;
        Ok(sources)
    }

    /// Rewrites the whole source-metadata file.
    pub fn save_sources(&self, sources: &[SourceMeta]) -> Result<()> {
        self.write_json(&self.sources_path(), sources)
    }

    /// Empties the store.
    pub fn clear(&self) -> Result<()> {
        for path in [self.corpus_path(), self.sources_path()] {
            if path.exists() {
                fs::remove_file(&path)
                    .map_err(|e| Error::Storage(format!("Failed to clear store: {e}")))?;
            }
        }
        Ok(())
    }

    /// Serialize to a temp file first, then rename into place, so readers
    /// never observe a half-written file.
    fn write_json<T: serde::Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| Error::Storage(format!("Failed to serialize store: {e}")))?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .map_err(|e| Error::Storage(format!("Failed to write store: {e}")))?;

        #[cfg(target_os = "windows")]
        if path.exists() {
            fs::remove_file(path)
                .map_err(|e| Error::Storage(format!("Failed to replace store: {e}")))?;
        }

        fs::rename(&tmp_path, path)
            .map_err(|e| Error::Storage(format!("Failed to commit store: {e}")))?;
        Ok(())
    }
}
