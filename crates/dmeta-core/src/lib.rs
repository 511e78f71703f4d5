//! # dmeta-core
//!
//! Core functionality for dmeta - a local cache and lookup engine for
//! script documentation meta embedded in an upstream source tree.
//!
//! Upstream sources annotate their code with tag-delimited comment blocks
//! (`// <--[command] ... // -->`). This crate downloads a source archive,
//! extracts every block into a structured record, persists the resulting
//! corpus as a flat file, and serves exact and ranked fuzzy name lookups
//! over it.
//!
//! ## Architecture
//!
//! - **Parsing**: [`parser`] locates blocks and runs the tag state machine;
//!   [`assembler`] applies it across a directory tree.
//! - **Search**: [`search`] scores records with a multi-signal ranking and
//!   falls back to edit-distance suggestions.
//! - **Ingest**: [`fetcher`] downloads and unpacks archives; [`storage`]
//!   persists the corpus; [`cache::MetaCache`] ties it all together.
//!
//! ## Quick start
//!
//! ```no_run
//! use dmeta_core::{MetaCache, Result};
//!
//! # async fn demo() -> Result<()> {
//! let mut meta = MetaCache::new()?;
//! meta.reload(None).await?;
//!
//! let response = meta.search_smart("blocks flagged", None);
//! for record in &response.results {
//!     println!("{} {}", record.kind, record.name);
//! }
//! # Ok(())
//! # }
//! ```

/// Corpus assembly over a directory tree
pub mod assembler;
/// The public cache facade
pub mod cache;
/// Global configuration
pub mod config;
/// Error types and result alias
pub mod error;
/// Archive download and extraction
pub mod fetcher;
/// Block location and tag parsing
pub mod parser;
/// Exact and ranked fuzzy search
pub mod search;
/// Flat-file persistence
pub mod storage;
/// Core data types
pub mod types;

pub use assembler::assemble_tree;
pub use cache::MetaCache;
pub use config::{Config, DEFAULT_SOURCE_URL, DefaultsConfig, PathsConfig};
pub use error::{Error, Result};
pub use fetcher::{ArchivePayload, Fetcher, unpack_archive};
pub use parser::{BlockLocator, RawBlock, parse_block, parse_source};
pub use search::{edit_distance, search, search_fields, search_smart};
pub use storage::Storage;
pub use types::{DocBlock, SearchResponse, SearchStatus, SourceMeta, TagValue};
