//! Source-listing command implementation.

use anyhow::{Context, Result};
use dmeta_core::MetaCache;

use crate::output::{OutputFormat, print_sources};

/// List ingested sources and their record counts.
pub async fn execute(format: OutputFormat) -> Result<()> {
    let cache = MetaCache::new().context("Failed to open the meta cache")?;
    print_sources(cache.sources(), format);
    Ok(())
}
