//! Search command implementation.

use anyhow::{Context, Result, bail};
use dmeta_core::MetaCache;

use crate::output::{OutputFormat, print_records, print_search_response};

/// Parsed search options.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// The query string, words joined with spaces.
    pub query: String,
    /// Optional record-kind filter.
    pub kind: Option<String>,
    /// Use the ranked fuzzy matcher.
    pub smart: bool,
    /// Match against every field instead of names.
    pub all_fields: bool,
    /// Maximum results to print.
    pub limit: usize,
    /// Output format.
    pub format: OutputFormat,
}

/// Execute a lookup against the cached corpus.
pub async fn execute(options: &SearchOptions) -> Result<()> {
    if options.query.trim().is_empty() {
        bail!("Search query must not be empty");
    }

    let cache = MetaCache::new().context("Failed to open the meta cache")?;
    if cache.corpus().is_empty() {
        bail!("The corpus is empty; run 'dmeta reload' first");
    }

    let kind = options.kind.as_deref();

    if options.all_fields {
        let records = cache.search_fields(&options.query);
        print_records(&records, options.limit, options.format);
        return Ok(());
    }

    let response = if options.smart {
        cache.search_smart(&options.query, kind)
    } else {
        cache.search(&options.query, kind)
    };
    print_search_response(&response, options.limit, options.format);
    Ok(())
}
