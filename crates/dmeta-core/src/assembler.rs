//! Corpus assembly: walk an extracted source tree and parse every matching
//! file into one ordered record sequence.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::Result;
use crate::parser::parse_source;
use crate::types::DocBlock;

/// Extension of the source files carrying meta blocks.
pub const SOURCE_EXTENSION: &str = "java";

/// Recursively parse a directory tree into records.
///
/// Result order is directory visitation order, then in-file appearance
/// order. Hidden entries, symlinks and files without the source extension
/// are skipped silently. Every record is stamped with the base name of the
/// file it came from.
pub fn assemble_tree(root: &Path) -> Result<Vec<DocBlock>> {
    let mut records = Vec::new();
    visit_dir(root, &mut records)?;
    debug!("Assembled {} records from {}", records.len(), root.display());
    Ok(records)
}

fn visit_dir(dir: &Path, records: &mut Vec<DocBlock>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let path = entry.path();

        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }

        if file_type.is_symlink() {
            warn!("Skipping symlink {}", path.display());
            continue;
        }

        if file_type.is_dir() {
            visit_dir(&path, records)?;
        } else if has_source_extension(&path) {
            records.extend(parse_file(&path)?);
        }
    }
    Ok(())
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == SOURCE_EXTENSION)
}

fn parse_file(path: &Path) -> Result<Vec<DocBlock>> {
    // Upstream trees occasionally carry stray non-UTF-8 bytes; parse what
    // decodes rather than failing the whole ingest.
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());

    let mut records = parse_source(&text);
    for record in &mut records {
        record.file.clone_from(&file_name);
    }
    Ok(records)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const FLAG_COMMAND: &str = "\
package net.example;

// <--[command]
// @Name flag
// @Syntax flag [target]
// -->

class FlagCommand {}
";

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn records_are_stamped_with_their_file_name() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "FlagCommand.java", FLAG_COMMAND);

        let records = assemble_tree(tmp.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "flag");
        assert_eq!(records[0].file.as_deref(), Some("FlagCommand.java"));
    }

    #[test]
    fn subdirectories_are_visited() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a/deep/FlagCommand.java", FLAG_COMMAND);

        let records = assemble_tree(tmp.path()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn non_matching_extensions_are_skipped() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "notes.txt", FLAG_COMMAND);
        write(tmp.path(), "FlagCommand.kt", FLAG_COMMAND);
        write(tmp.path(), "FlagCommand.java", FLAG_COMMAND);

        let records = assemble_tree(tmp.path()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn hidden_entries_are_skipped() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), ".hidden/FlagCommand.java", FLAG_COMMAND);
        write(tmp.path(), ".Hidden.java", FLAG_COMMAND);

        let records = assemble_tree(tmp.path()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn property_expansion_stamps_both_records() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "ItemDisplay.java",
            "// <--[property]\n// @object Item\n// @name display\n// -->\n",
        );

        let records = assemble_tree(tmp.path()).unwrap();
        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record.file.as_deref(), Some("ItemDisplay.java"));
        }
    }

    #[test]
    fn data_blocks_never_reach_the_output() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "Data.java",
            "// <--[data]\n// @name dropped\n// -->\n// <--[command]\n// @name kept\n// -->\n",
        );

        let records = assemble_tree(tmp.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "kept");
    }
}
