//! Reload command implementation.

use anyhow::{Context, Result};
use colored::Colorize;
use dmeta_core::MetaCache;

/// Replace the entire corpus from one archive.
pub async fn execute(url: Option<&str>) -> Result<()> {
    let mut cache = MetaCache::new().context("Failed to open the meta cache")?;

    let count = cache
        .reload(url)
        .await
        .context("Failed to reload the corpus")?;

    println!("{} {count} records", "Reloaded".green().bold());
    Ok(())
}
