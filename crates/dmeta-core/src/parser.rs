//! Meta-block extraction: the block locator and the tag state machine.
//!
//! Documentation lives in comment blocks delimited by a start marker
//! carrying a kind label and a bare end marker:
//!
//! ```text
//! // <--[command]
//! // @Name flag
//! // @Syntax flag [target] [name]
//! // @Description
//! // Sets or removes a flag.
//! // -->
//! ```
//!
//! [`BlockLocator`] finds the raw line ranges; [`parse_block`] interprets the
//! `@tag` micro-language inside one block and produces zero, one or two
//! records. Malformed blocks never error - missing fields are simply absent
//! and a missing name falls back to `"unknown"`.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::types::{DocBlock, TagValue};

static BLOCK_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"// <--\[(.*?)\]").unwrap());
static BLOCK_END_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"// -->").unwrap());

/// One delimited run of comment lines, tagged with its kind label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock<'a> {
    /// Label captured from the start marker.
    pub kind: &'a str,
    /// Body lines between the markers, exclusive on both ends.
    pub body: Vec<&'a str>,
}

/// Lazy scanner yielding raw blocks in file order.
///
/// Blocks do not nest: the first end marker after a start marker closes the
/// block, and any start marker in between is ordinary body text. A block
/// whose end marker is missing silently extends to end of file.
pub struct BlockLocator<'a> {
    lines: std::str::Lines<'a>,
}

impl<'a> BlockLocator<'a> {
    /// Scan the full text content of one file.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
        }
    }
}

impl<'a> Iterator for BlockLocator<'a> {
    type Item = RawBlock<'a>;

    #[allow(clippy::while_let_on_iterator)]
    fn next(&mut self) -> Option<Self::Item> {
        while let Some(line) = self.lines.next() {
            let Some(captures) = BLOCK_START_RE.captures(line) else {
                continue;
            };
            let kind = captures.get(1).map_or("", |m| m.as_str());

            let mut body = Vec::new();
            while let Some(body_line) = self.lines.next() {
                if BLOCK_END_RE.is_match(body_line) {
                    break;
                }
                body.push(body_line);
            }
            return Some(RawBlock { kind, body });
        }
        None
    }
}

/// Tag state machine: either between tags, or collecting lines for one.
enum TagState {
    NoOpenTag,
    InTag(String),
}

/// Working copy of a record while its block is being consumed.
#[derive(Default)]
struct Draft {
    name: Option<String>,
    syntax: Option<String>,
    events: Vec<String>,
    fields: BTreeMap<String, TagValue>,
}

impl Draft {
    /// Commit buffered tag content using the accumulation rule: first commit
    /// sets the field, a repeat turns it into a list, further repeats append.
    fn commit(&mut self, tag: &str, buffer: &mut Vec<String>) {
        let joined = buffer.join("\n");
        let content = if tag == "description" {
            joined
        } else {
            joined.trim().to_string()
        };
        buffer.clear();

        if content.is_empty() {
            return;
        }

        if tag == "events" {
            self.events.extend(
                content
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string),
            );
            return;
        }

        match self.fields.entry(tag.to_string()) {
            std::collections::btree_map::Entry::Vacant(e) => {
                e.insert(TagValue::Scalar(content));
            },
            std::collections::btree_map::Entry::Occupied(mut e) => e.get_mut().push(content),
        }
    }
}

/// Parse one block body into records.
///
/// `data` blocks are discarded entirely. A `property` block never survives
/// as-is; it expands into a derived tag record and a derived mechanism
/// record. Everything else produces exactly one record.
#[must_use]
pub fn parse_block(kind: &str, body: &[&str]) -> Vec<DocBlock> {
    if kind == "data" {
        return Vec::new();
    }

    let mut draft = Draft::default();
    let mut state = TagState::NoOpenTag;
    let mut buffer: Vec<String> = Vec::new();
    let mut first_usage_line = false;

    for raw in body {
        let line = strip_comment_prefix(raw.trim());

        if line.is_empty() {
            // Description keeps internal blank lines as paragraph breaks.
            if matches!(&state, TagState::InTag(tag) if tag == "description") {
                buffer.push(String::new());
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix('@') {
            if let TagState::InTag(tag) = &state {
                let tag = tag.clone();
                draft.commit(&tag, &mut buffer);
            }
            state = TagState::NoOpenTag;
            first_usage_line = false;

            let (key, value) = match rest.split_once(' ') {
                Some((key, value)) => (key, value.trim()),
                None => (rest, ""),
            };
            let tag = key.to_lowercase();

            match tag.as_str() {
                "attribute" if value.starts_with('<') && value.ends_with('>') => {
                    let derived = attribute_name(&value[1..value.len() - 1]);
                    if !derived.is_empty() {
                        draft.name = Some(derived);
                    }
                    draft.syntax = Some(value.to_string());
                },
                "name" => {
                    draft.name = (!value.is_empty()).then(|| value.to_string());
                },
                "syntax" => {
                    draft.syntax = (!value.is_empty()).then(|| value.to_string());
                },
                "events" => {
                    // Event lines come from the body only; the marker-line
                    // value is dropped.
                    state = TagState::InTag(tag.clone());
                },
                _ => {
                    first_usage_line = tag == "usage";
                    if !value.is_empty() {
                        push_content(&mut buffer, &tag, &mut first_usage_line, value);
                    }
                    state = TagState::InTag(tag.clone());
                },
            }
            continue;
        }

        if let TagState::InTag(tag) = &state {
            let tag = tag.clone();
            push_content(&mut buffer, &tag, &mut first_usage_line, line);
        }
    }

    if let TagState::InTag(tag) = &state {
        let tag = tag.clone();
        draft.commit(&tag, &mut buffer);
    }

    if draft.name.is_none() {
        if let Some(first_event) = draft.events.first() {
            draft.name = Some(first_event.clone());
        }
    }

    if kind == "property" {
        return expand_property(&draft);
    }

    vec![DocBlock {
        kind: kind.to_string(),
        name: draft.name.unwrap_or_else(|| "unknown".to_string()),
        syntax: draft.syntax,
        events: draft.events,
        file: None,
        fields: draft.fields,
    }]
}

/// Parse every block in one file's text, in file order.
///
/// A start marker with an empty kind label produces nothing.
#[must_use]
pub fn parse_source(text: &str) -> Vec<DocBlock> {
    BlockLocator::new(text)
        .filter(|block| !block.kind.is_empty())
        .flat_map(|block| parse_block(block.kind, &block.body))
        .collect()
}

/// Strip the leading comment prefix: `//` plus at most one following
/// whitespace character. Deeper indentation after the prefix is preserved.
fn strip_comment_prefix(line: &str) -> &str {
    match line.strip_prefix("//") {
        Some(rest) => match rest.chars().next() {
            Some(c) if c.is_whitespace() => &rest[c.len_utf8()..],
            _ => rest,
        },
        None => line,
    }
}

/// Append a content line to the open tag's buffer.
///
/// The first content line of a `usage` tag is marked as a commented
/// annotation line unless it already carries the comment hint.
fn push_content(buffer: &mut Vec<String>, tag: &str, first_usage_line: &mut bool, line: &str) {
    if tag == "usage" && *first_usage_line {
        *first_usage_line = false;
        if !line.starts_with('#') {
            buffer.push(format!("# {line}"));
            return;
        }
    }
    buffer.push(line.to_string());
}

/// Derive a record name from a bracket-stripped attribute expression.
///
/// Everything after the first `.` is kept (or the whole text when there is
/// no dot), with bracketed placeholder groups removed:
/// `ObjectTag.property[param]` -> `property`.
fn attribute_name(inner: &str) -> String {
    let base = inner.find('.').map_or(inner, |dot| &inner[dot + 1..]);
    strip_placeholder_groups(base)
}

/// Remove `[...]` placeholder groups, tolerating nesting and an unclosed
/// trailing group.
fn strip_placeholder_groups(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {},
        }
    }
    out
}

/// Expand a parsed `property` block into its two derived records.
///
/// The property itself is never materialized; it yields a tag record for
/// the qualified attribute and a mechanism record for the bare property
/// name. Both copies retain every other parsed field unchanged.
fn expand_property(draft: &Draft) -> Vec<DocBlock> {
    let object_name = draft
        .fields
        .get("object")
        .map_or_else(|| "UnknownObject".to_string(), TagValue::joined);
    let property_name = draft
        .name
        .clone()
        .unwrap_or_else(|| "unknown".to_string());
    let qualified = format!("{object_name}.{property_name}");

    let first_description_line = draft
        .fields
        .get("description")
        .map(TagValue::joined)
        .and_then(|d| d.lines().next().map(str::trim).map(str::to_string))
        .unwrap_or_default();

    let mut tag_record = DocBlock {
        kind: "tag".to_string(),
        name: qualified.clone(),
        syntax: Some(format!("<{qualified}>")),
        events: draft.events.clone(),
        file: None,
        fields: draft.fields.clone(),
    };
    tag_record.set_field("mechanism", qualified.clone());

    let mut mechanism_record = DocBlock {
        kind: "mechanism".to_string(),
        name: property_name,
        syntax: draft.syntax.clone(),
        events: draft.events.clone(),
        file: None,
        fields: draft.fields.clone(),
    };
    mechanism_record.set_field("tags", format!("<{qualified}> {first_description_line}"));

    vec![tag_record, mechanism_record]
}
