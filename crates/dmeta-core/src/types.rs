//! Core data types: meta records, tag values and search results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Content of one tag field: a single string, or an ordered sequence when
/// the same tag repeated within a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    /// The tag appeared once.
    Scalar(String),
    /// The tag repeated; entries are kept in order of appearance.
    List(Vec<String>),
}

impl TagValue {
    /// Fold another committed chunk into this value.
    ///
    /// A scalar becomes a two-element list; a list grows by one.
    pub fn push(&mut self, content: String) {
        match self {
            Self::Scalar(prev) => {
                *self = Self::List(vec![std::mem::take(prev), content]);
            },
            Self::List(items) => items.push(content),
        }
    }

    /// Render the value as one string, joining list entries with commas.
    #[must_use]
    pub fn joined(&self) -> String {
        match self {
            Self::Scalar(s) => s.clone(),
            Self::List(items) => items.join(","),
        }
    }
}

/// One structured documentation record extracted from a meta block.
///
/// `kind`, `name`, `syntax` and `events` receive special handling during
/// parsing; every other tag lands in the open `fields` mapping keyed by its
/// lowercased tag name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocBlock {
    /// Block-type label from the start marker ("command", "tag", ...).
    #[serde(rename = "type")]
    pub kind: String,

    /// Canonical identifying string; "unknown" when none could be derived.
    pub name: String,

    /// Canonical usage-pattern string, when one was given or derived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syntax: Option<String>,

    /// Event lines, trimmed and non-empty, in order of appearance.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,

    /// Base name of the file the block was extracted from. Attached by the
    /// assembler, never by the parser.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// All remaining tag fields.
    #[serde(flatten)]
    pub fields: BTreeMap<String, TagValue>,
}

impl DocBlock {
    /// Create an empty record of the given kind with the default name.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: "unknown".to_string(),
            syntax: None,
            events: Vec::new(),
            file: None,
            fields: BTreeMap::new(),
        }
    }

    /// Look up a generic tag field by its lowercase name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&TagValue> {
        self.fields.get(name)
    }

    /// Set a generic tag field, replacing any previous value.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields
            .insert(name.into(), TagValue::Scalar(value.into()));
    }

    /// Merge a plugin label into the comma-separated `plugin` field.
    ///
    /// Existing entries are trim-compared case-insensitively, so re-adding a
    /// source under a differently-cased label does not duplicate it. Entry
    /// order is preserved and a new label is appended.
    pub fn merge_plugin(&mut self, label: &str) {
        let label = label.trim();
        if label.is_empty() {
            return;
        }

        let mut entries: Vec<String> = self
            .fields
            .get("plugin")
            .map(|v| {
                v.joined()
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        if !entries.iter().any(|e| e.eq_ignore_ascii_case(label)) {
            entries.push(label.to_string());
        }

        self.fields
            .insert("plugin".to_string(), TagValue::Scalar(entries.join(", ")));
    }
}

/// Outcome of a search operation. Searches never fail for a well-formed
/// non-empty query; they always resolve to one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    /// One or more records matched.
    Ok,
    /// Nothing matched, but a near name (edit distance <= 2) exists.
    Suggestion,
    /// Nothing matched and no near name exists.
    NotFound,
}

/// Result of a `search` or `search_smart` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// How the search resolved.
    pub status: SearchStatus,
    /// Matching records, best first for ranked search, corpus order otherwise.
    pub results: Vec<DocBlock>,
    /// The single nearest name when `status` is `Suggestion`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl SearchResponse {
    pub(crate) fn ok(results: Vec<DocBlock>) -> Self {
        Self {
            status: SearchStatus::Ok,
            results,
            suggestion: None,
        }
    }

    pub(crate) fn suggestion(name: String) -> Self {
        Self {
            status: SearchStatus::Suggestion,
            results: Vec::new(),
            suggestion: Some(name),
        }
    }

    pub(crate) fn not_found() -> Self {
        Self {
            status: SearchStatus::NotFound,
            results: Vec::new(),
            suggestion: None,
        }
    }
}

/// Metadata about one ingested source archive, persisted alongside the
/// corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMeta {
    /// Archive URL the records came from.
    pub url: String,
    /// When the archive was fetched.
    pub fetched_at: DateTime<Utc>,
    /// Hash of the downloaded payload.
    pub sha256: String,
    /// Number of records the archive contributed.
    pub records: usize,
    /// Plugin label stamped onto the records, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,
}
