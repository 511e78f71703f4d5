//! The public facade: an in-memory corpus backed by the flat-file store,
//! with ingest and search operations.

use chrono::Utc;
use std::time::Duration;
use tracing::info;

use crate::assembler::assemble_tree;
use crate::config::Config;
use crate::error::Result;
use crate::fetcher::{Fetcher, unpack_archive};
use crate::search;
use crate::storage::Storage;
use crate::types::{DocBlock, SearchResponse, SourceMeta};

/// Meta cache: the assembled corpus plus its collaborators.
///
/// The corpus is held entirely in memory as one ordered sequence; searches
/// are read-only snapshots against it. `reload` swaps the sequence only
/// after the replacement is fully built, so a failed ingest leaves the
/// previous corpus untouched.
pub struct MetaCache {
    config: Config,
    storage: Storage,
    fetcher: Fetcher,
    corpus: Vec<DocBlock>,
    sources: Vec<SourceMeta>,
}

impl MetaCache {
    /// Open the cache using the global configuration, loading any persisted
    /// corpus from disk.
    pub fn new() -> Result<Self> {
        Self::with_config(Config::load()?)
    }

    /// Open the cache with an explicit configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        let storage = Storage::with_root(config.paths.root.clone())?;
        Self::with_storage(config, storage)
    }

    /// Open the cache with explicit collaborators (primarily for tests).
    pub fn with_storage(config: Config, storage: Storage) -> Result<Self> {
        let fetcher = Fetcher::with_timeout(Duration::from_secs(config.defaults.fetch_timeout_secs))?;
        let corpus = storage.load_corpus()?;
        let sources = storage.load_sources()?;
        Ok(Self {
            config,
            storage,
            fetcher,
            corpus,
            sources,
        })
    }

    /// Replace the entire corpus from one archive.
    ///
    /// With no URL the configured default source is used. Returns the number
    /// of records in the new corpus.
    pub async fn reload(&mut self, source_url: Option<&str>) -> Result<usize> {
        let url = source_url.unwrap_or(&self.config.defaults.source_url).to_string();
        let (records, meta) = self.ingest(&url, None).await?;

        self.storage.save_corpus(&records)?;
        self.storage.save_sources(std::slice::from_ref(&meta))?;

        info!("Reloaded corpus: {} records from {}", records.len(), url);
        self.corpus = records;
        self.sources = vec![meta];
        Ok(self.corpus.len())
    }

    /// Parse an additional archive and append its records to the corpus.
    ///
    /// When a plugin label is given, it is merged into every new record's
    /// comma-separated `plugin` field. Returns the number of records added.
    pub async fn add_source(&mut self, url: &str, plugin: Option<&str>) -> Result<usize> {
        let (mut records, meta) = self.ingest(url, plugin).await?;

        if let Some(label) = plugin {
            for record in &mut records {
                record.merge_plugin(label);
            }
        }

        let added = records.len();
        let mut combined = self.corpus.clone();
        combined.extend(records);

        self.storage.save_corpus(&combined)?;
        let mut sources = self.sources.clone();
        sources.push(meta);
        self.storage.save_sources(&sources)?;

        info!("Added source {}: {} records", url, added);
        self.corpus = combined;
        self.sources = sources;
        Ok(added)
    }

    /// Substring lookup on record names; see [`search::search`].
    #[must_use]
    pub fn search(&self, query: &str, kind: Option<&str>) -> SearchResponse {
        search::search(&self.corpus, query, kind)
    }

    /// Ranked fuzzy lookup; see [`search::search_smart`].
    #[must_use]
    pub fn search_smart(&self, query: &str, kind: Option<&str>) -> SearchResponse {
        search::search_smart(&self.corpus, query, kind)
    }

    /// Substring filter across every record field; see
    /// [`search::search_fields`].
    #[must_use]
    pub fn search_fields(&self, query: &str) -> Vec<DocBlock> {
        search::search_fields(&self.corpus, query)
    }

    /// The assembled corpus, in insertion order.
    #[must_use]
    pub fn corpus(&self) -> &[DocBlock] {
        &self.corpus
    }

    /// Metadata of every ingested source.
    #[must_use]
    pub fn sources(&self) -> &[SourceMeta] {
        &self.sources
    }

    /// Download, unpack and assemble one archive into records.
    async fn ingest(&self, url: &str, plugin: Option<&str>) -> Result<(Vec<DocBlock>, SourceMeta)> {
        let payload = self.fetcher.fetch_archive(url).await?;

        let workdir = tempfile::tempdir()?;
        unpack_archive(&payload.bytes, workdir.path())?;
        let records = assemble_tree(workdir.path())?;

        let meta = SourceMeta {
            url: url.to_string(),
            fetched_at: Utc::now(),
            sha256: payload.sha256,
            records: records.len(),
            plugin: plugin.map(str::to_string),
        };
        Ok((records, meta))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::PathsConfig;
    use std::io::{Cursor, Write};
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use zip::write::SimpleFileOptions;

    fn zip_of(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn test_cache(root: &TempDir) -> MetaCache {
        let config = Config {
            paths: PathsConfig {
                root: root.path().to_path_buf(),
            },
            ..Config::default()
        };
        MetaCache::with_config(config).unwrap()
    }

    const FLAG_JAVA: &str = "\
// <--[command]
// @Name flag
// @Syntax flag [target]
// -->
";

    const NOTE_JAVA: &str = "\
// <--[command]
// @Name note
// -->
";

    async fn serve_zip(server: &MockServer, route: &str, bytes: Vec<u8>) {
        Mock::given(method("GET"))
            .and(path(route.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn reload_replaces_the_corpus_and_persists_it() {
        let server = MockServer::start().await;
        serve_zip(
            &server,
            "/repo/dev.zip",
            zip_of(&[("repo-dev/FlagCommand.java", FLAG_JAVA)]),
        )
        .await;

        let root = TempDir::new().unwrap();
        let mut cache = test_cache(&root);

        let count = cache
            .reload(Some(&format!("{}/repo/dev.zip", server.uri())))
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(cache.corpus()[0].name, "flag");
        assert_eq!(cache.sources().len(), 1);

        // A fresh cache over the same root sees the persisted corpus.
        let reopened = test_cache(&root);
        assert_eq!(reopened.corpus().len(), 1);
    }

    #[tokio::test]
    async fn failed_reload_leaves_corpus_unchanged() {
        let server = MockServer::start().await;
        serve_zip(
            &server,
            "/repo/dev.zip",
            zip_of(&[("repo-dev/FlagCommand.java", FLAG_JAVA)]),
        )
        .await;

        let root = TempDir::new().unwrap();
        let mut cache = test_cache(&root);
        cache
            .reload(Some(&format!("{}/repo/dev.zip", server.uri())))
            .await
            .unwrap();

        let result = cache
            .reload(Some(&format!("{}/gone.zip", server.uri())))
            .await;
        assert!(result.is_err());
        assert_eq!(cache.corpus().len(), 1);
    }

    #[tokio::test]
    async fn add_source_appends_and_stamps_plugin() {
        let server = MockServer::start().await;
        serve_zip(
            &server,
            "/repo/dev.zip",
            zip_of(&[("repo-dev/FlagCommand.java", FLAG_JAVA)]),
        )
        .await;
        serve_zip(
            &server,
            "/addon/dev.zip",
            zip_of(&[("addon-dev/NoteCommand.java", NOTE_JAVA)]),
        )
        .await;

        let root = TempDir::new().unwrap();
        let mut cache = test_cache(&root);
        cache
            .reload(Some(&format!("{}/repo/dev.zip", server.uri())))
            .await
            .unwrap();

        let added = cache
            .add_source(&format!("{}/addon/dev.zip", server.uri()), Some("Depenizen"))
            .await
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(cache.corpus().len(), 2);

        let note = &cache.corpus()[1];
        assert_eq!(note.name, "note");
        assert_eq!(
            note.field("plugin"),
            Some(&crate::types::TagValue::Scalar("Depenizen".into()))
        );

        // Old records are untouched.
        assert!(cache.corpus()[0].field("plugin").is_none());
    }

    #[tokio::test]
    async fn search_operations_run_against_the_loaded_corpus() {
        let server = MockServer::start().await;
        serve_zip(
            &server,
            "/repo/dev.zip",
            zip_of(&[
                ("repo-dev/FlagCommand.java", FLAG_JAVA),
                ("repo-dev/NoteCommand.java", NOTE_JAVA),
            ]),
        )
        .await;

        let root = TempDir::new().unwrap();
        let mut cache = test_cache(&root);
        cache
            .reload(Some(&format!("{}/repo/dev.zip", server.uri())))
            .await
            .unwrap();

        let exact = cache.search("flag", Some("command"));
        assert_eq!(exact.results.len(), 1);

        let near = cache.search("flg", None);
        assert_eq!(near.suggestion.as_deref(), Some("flag"));

        let smart = cache.search_smart("flag", None);
        assert_eq!(smart.results[0].name, "flag");

        let everywhere = cache.search_fields("flagcommand.java");
        assert_eq!(everywhere.len(), 1);
    }
}
