//! Add-source command implementation.

use anyhow::{Context, Result};
use colored::Colorize;
use dmeta_core::MetaCache;

/// Parse an additional archive and append its records to the corpus.
pub async fn execute(url: &str, plugin: Option<&str>) -> Result<()> {
    let mut cache = MetaCache::new().context("Failed to open the meta cache")?;

    let added = cache
        .add_source(url, plugin)
        .await
        .with_context(|| format!("Failed to add source '{url}'"))?;

    println!(
        "{} {added} records ({} total)",
        "Added".green().bold(),
        cache.corpus().len()
    );
    Ok(())
}
