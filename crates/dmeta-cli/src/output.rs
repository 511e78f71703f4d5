//! Output rendering for search results and source listings.

use clap::ValueEnum;
use colored::Colorize;
use dmeta_core::{DocBlock, SearchResponse, SearchStatus, SourceMeta, TagValue};

/// Output format selector shared by the lookup commands.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable formatted output
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
}

/// Render a search response.
pub fn print_search_response(response: &SearchResponse, limit: usize, format: OutputFormat) {
    if format == OutputFormat::Json {
        print_json(response);
        return;
    }

    match response.status {
        SearchStatus::Ok => {
            let total = response.results.len();
            for record in response.results.iter().take(limit) {
                print_record(record);
            }
            if total > limit {
                println!("{}", format!("... and {} more", total - limit).dimmed());
            }
        },
        SearchStatus::Suggestion => {
            let suggestion = response.suggestion.as_deref().unwrap_or_default();
            println!("No matches. Did you mean {}?", suggestion.yellow().bold());
        },
        SearchStatus::NotFound => println!("{}", "No matches.".red()),
    }
}

/// Render a plain record list (the `--all-fields` path).
pub fn print_records(records: &[DocBlock], limit: usize, format: OutputFormat) {
    if format == OutputFormat::Json {
        print_json(records);
        return;
    }

    if records.is_empty() {
        println!("{}", "No matches.".red());
        return;
    }
    for record in records.iter().take(limit) {
        print_record(record);
    }
    if records.len() > limit {
        println!(
            "{}",
            format!("... and {} more", records.len() - limit).dimmed()
        );
    }
}

/// Render the source listing.
pub fn print_sources(sources: &[SourceMeta], format: OutputFormat) {
    if format == OutputFormat::Json {
        print_json(sources);
        return;
    }

    if sources.is_empty() {
        println!("No sources ingested yet. Run {} first.", "dmeta reload".bold());
        return;
    }
    for source in sources {
        let plugin = source
            .plugin
            .as_deref()
            .map(|p| format!(" [{p}]"))
            .unwrap_or_default();
        println!(
            "{}  {} records, fetched {}{}",
            source.url.cyan(),
            source.records,
            source.fetched_at.format("%Y-%m-%d %H:%M UTC"),
            plugin.dimmed(),
        );
    }
}

fn print_record(record: &DocBlock) {
    let header = format!("[{}] {}", record.kind, record.name);
    println!("{}", header.cyan().bold());

    if let Some(syntax) = &record.syntax {
        println!("  syntax: {syntax}");
    }
    if !record.events.is_empty() {
        println!("  events: {}", record.events.join(", "));
    }
    if let Some(TagValue::Scalar(description)) = record.field("description") {
        if let Some(first_line) = description.lines().next() {
            println!("  {}", first_line.dimmed());
        }
    }
    if let Some(file) = &record.file {
        println!("  {}", format!("from {file}").dimmed());
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize output: {e}"),
    }
}
