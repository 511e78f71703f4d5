//! Name-based lookup over the assembled corpus.
//!
//! Two entry points share the same suggestion fallback:
//!
//! - [`search`]: case-insensitive substring match on record names, with an
//!   optional kind filter.
//! - [`search_smart`]: multi-signal scored ranking that tolerates fuzzier
//!   queries ("blocks flagged" finds `blocks_flagged`).
//!
//! Both are read-only snapshots against the in-memory corpus and never fail
//! for a well-formed non-empty query.

use crate::types::{DocBlock, SearchResponse};

/// Fixed ranking priority among record kinds; unlisted kinds sort last.
const TYPE_PRIORITY: [&str; 7] = [
    "command",
    "tag",
    "mechanism",
    "objecttype",
    "event",
    "language",
    "action",
];

/// Maximum edit distance for the "did you mean" fallback.
const SUGGESTION_DISTANCE: usize = 2;

/// Score awarded when the whole query equals the record name.
const FULL_MATCH: f64 = 200.0;
/// Score awarded when the record name starts with the whole query.
const PREFIX_MATCH: f64 = 120.0;
/// Score awarded when the record name contains the whole query.
const SUBSTRING_MATCH: f64 = 40.0;
/// Bonus when every word of a multi-word query matched some name word.
const ALL_WORDS_BONUS: f64 = 50.0;
/// Score awarded when the record's event text contains the whole query.
const EVENT_MATCH: f64 = 20.0;

/// Levenshtein distance with unit cost for insert, delete and substitute.
#[must_use]
pub fn edit_distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// Substring lookup on record names, preserving corpus order.
///
/// When nothing contains the query, the nearest name within edit distance 2
/// is offered as a suggestion instead.
#[must_use]
pub fn search(corpus: &[DocBlock], query: &str, kind: Option<&str>) -> SearchResponse {
    let query = query.to_lowercase();
    let filtered = filter_by_kind(corpus, kind);

    let matches: Vec<DocBlock> = filtered
        .iter()
        .filter(|r| r.name.to_lowercase().contains(&query))
        .map(|r| (*r).clone())
        .collect();

    if !matches.is_empty() {
        return SearchResponse::ok(matches);
    }

    match nearest_name(&filtered, &query) {
        Some(name) => SearchResponse::suggestion(name),
        None => SearchResponse::not_found(),
    }
}

/// Ranked fuzzy lookup on record names.
///
/// Each record is scored against the query as a whole (full, prefix,
/// substring and event-text matches) and word by word (exact, near and
/// partial word matches), with a length penalty separating close calls.
/// Results are ordered by score, then kind priority, then corpus order.
#[must_use]
pub fn search_smart(corpus: &[DocBlock], query: &str, kind: Option<&str>) -> SearchResponse {
    let query = query.trim().to_lowercase();
    let query_words: Vec<&str> = query.split_whitespace().collect();
    let filtered = filter_by_kind(corpus, kind);

    let mut scored: Vec<(f64, &DocBlock)> = filtered
        .iter()
        .filter_map(|r| {
            let score = score_record(r, &query, &query_words);
            (score > 0.0).then_some((score, *r))
        })
        .collect();

    // Stable sort: equal score and equal priority keep corpus order.
    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b
            .total_cmp(score_a)
            .then_with(|| type_rank(&a.kind).cmp(&type_rank(&b.kind)))
    });

    if !scored.is_empty() {
        return SearchResponse::ok(scored.into_iter().map(|(_, r)| r.clone()).collect());
    }

    match nearest_name(&filtered, &query) {
        Some(name) => SearchResponse::suggestion(name),
        None => SearchResponse::not_found(),
    }
}

/// Substring filter across every field of every record, in corpus order.
///
/// Unlike [`search`] this also looks inside syntax, events, file names and
/// all generic tag fields.
#[must_use]
pub fn search_fields(corpus: &[DocBlock], query: &str) -> Vec<DocBlock> {
    let query = query.to_lowercase();
    corpus
        .iter()
        .filter(|r| record_text(r).contains(&query))
        .cloned()
        .collect()
}

fn filter_by_kind<'a>(corpus: &'a [DocBlock], kind: Option<&str>) -> Vec<&'a DocBlock> {
    match kind {
        Some(kind) => corpus
            .iter()
            .filter(|r| r.kind.eq_ignore_ascii_case(kind))
            .collect(),
        None => corpus.iter().collect(),
    }
}

/// The single nearest record name within the suggestion threshold, ties
/// broken by first occurrence in corpus order.
fn nearest_name(filtered: &[&DocBlock], query: &str) -> Option<String> {
    let mut best: Option<(usize, &str)> = None;
    for record in filtered {
        let distance = edit_distance(query, &record.name.to_lowercase());
        if best.is_none_or(|(best_distance, _)| distance < best_distance) {
            best = Some((distance, record.name.as_str()));
        }
    }
    best.and_then(|(distance, name)| {
        (distance <= SUGGESTION_DISTANCE).then(|| name.to_string())
    })
}

fn score_record(record: &DocBlock, query: &str, query_words: &[&str]) -> f64 {
    let name = record.name.to_lowercase();
    let name_no_dot = name.strip_prefix('.').unwrap_or(&name);
    let mut score = 0.0;

    if query == name || query == name_no_dot {
        score += FULL_MATCH;
    }

    if name.starts_with(query) || name_no_dot.starts_with(query) {
        score += PREFIX_MATCH;
    } else if name.contains(query) || name_no_dot.contains(query) {
        score += SUBSTRING_MATCH;
    }

    let name_words: Vec<&str> = name
        .split(|c: char| c.is_whitespace() || c == '_' || c == '.')
        .filter(|w| !w.is_empty())
        .collect();

    let mut all_words_matched = !query_words.is_empty();
    for query_word in query_words {
        let best = name_words
            .iter()
            .map(|name_word| word_score(query_word, name_word))
            .fold(0.0, f64::max);
        score += best;
        if best <= 0.0 {
            all_words_matched = false;
        }
    }
    if query_words.len() > 1 && all_words_matched {
        score += ALL_WORDS_BONUS;
    }

    if !record.events.is_empty() {
        let events = record.events.join(" ").to_lowercase();
        if events.contains(query) {
            score += EVENT_MATCH;
        }
    }

    // A long name matching a short query is a weaker signal than an exact
    // length fit.
    if score > 0.0 {
        score -= 0.5 * name.len().abs_diff(query.len()) as f64;
    }

    score
}

/// Best score of one query word against one name word.
fn word_score(query_word: &str, name_word: &str) -> f64 {
    if name_word == query_word {
        return 30.0;
    }
    let distance = edit_distance(query_word, name_word);
    if distance <= 2 {
        return 20.0 - 5.0 * distance as f64;
    }
    if name_word.starts_with(query_word) {
        return 15.0;
    }
    if name_word.contains(query_word) {
        return 5.0;
    }
    0.0
}

fn type_rank(kind: &str) -> usize {
    let kind = kind.to_lowercase();
    TYPE_PRIORITY
        .iter()
        .position(|t| *t == kind)
        .unwrap_or(TYPE_PRIORITY.len())
}

fn record_text(record: &DocBlock) -> String {
    let mut text = String::new();
    text.push_str(&record.kind);
    text.push(' ');
    text.push_str(&record.name);
    if let Some(syntax) = &record.syntax {
        text.push(' ');
        text.push_str(syntax);
    }
    for event in &record.events {
        text.push(' ');
        text.push_str(event);
    }
    if let Some(file) = &record.file {
        text.push(' ');
        text.push_str(file);
    }
    for value in record.fields.values() {
        text.push(' ');
        text.push_str(&value.joined());
    }
    text.to_lowercase()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::SearchStatus;
    use proptest::prelude::*;

    fn record(kind: &str, name: &str) -> DocBlock {
        let mut block = DocBlock::new(kind);
        block.name = name.to_string();
        block
    }

    #[test]
    fn substring_matches_return_all_in_corpus_order() {
        let corpus = vec![record("command", "flag"), record("tag", "flagged")];
        let response = search(&corpus, "flag", None);

        assert_eq!(response.status, SearchStatus::Ok);
        let names: Vec<_> = response.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["flag", "flagged"]);
    }

    #[test]
    fn near_miss_becomes_a_suggestion() {
        let corpus = vec![record("command", "flag")];
        let response = search(&corpus, "flg", None);

        assert_eq!(response.status, SearchStatus::Suggestion);
        assert_eq!(response.suggestion.as_deref(), Some("flag"));
        assert!(response.results.is_empty());
    }

    #[test]
    fn far_miss_is_not_found() {
        let corpus = vec![record("command", "flag")];
        let response = search(&corpus, "teleport", None);
        assert_eq!(response.status, SearchStatus::NotFound);
        assert!(response.suggestion.is_none());
    }

    #[test]
    fn kind_filter_is_case_insensitive_and_exact() {
        let corpus = vec![record("command", "flag"), record("tag", "flag")];

        let response = search(&corpus, "flag", Some("Tag"));
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].kind, "tag");

        let response = search(&corpus, "flag", Some("mechanism"));
        assert_eq!(response.status, SearchStatus::NotFound);
    }

    #[test]
    fn suggestion_tie_breaks_on_first_occurrence() {
        let corpus = vec![record("command", "flab"), record("command", "flam")];
        let response = search(&corpus, "flag", None);
        assert_eq!(response.suggestion.as_deref(), Some("flab"));
    }

    #[test]
    fn smart_ranks_exact_name_above_prefix_match() {
        let corpus = vec![record("tag", "flagged"), record("command", "flag")];
        let response = search_smart(&corpus, "flag", None);

        assert_eq!(response.status, SearchStatus::Ok);
        let names: Vec<_> = response.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["flag", "flagged"]);
    }

    #[test]
    fn smart_matches_words_across_underscores() {
        let corpus = vec![
            record("tag", "blocks_flagged"),
            record("command", "teleport"),
        ];
        let response = search_smart(&corpus, "blocks flagged", None);

        assert_eq!(response.status, SearchStatus::Ok);
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].name, "blocks_flagged");
    }

    #[test]
    fn smart_ignores_leading_dot_in_names() {
        let corpus = vec![record("tag", ".flag")];
        let response = search_smart(&corpus, "flag", None);
        assert_eq!(response.status, SearchStatus::Ok);
    }

    #[test]
    fn smart_scores_event_text() {
        let mut with_event = record("event", "player jumps");
        with_event.events = vec!["player jumps".into(), "entity jumps".into()];
        let corpus = vec![with_event];

        let response = search_smart(&corpus, "entity jumps", None);
        assert_eq!(response.status, SearchStatus::Ok);
    }

    #[test]
    fn smart_ties_break_on_type_priority() {
        // Same name, same score; the command outranks the mechanism even
        // though the mechanism comes first in the corpus.
        let corpus = vec![record("mechanism", "flag"), record("command", "flag")];
        let response = search_smart(&corpus, "flag", None);

        let kinds: Vec<_> = response.results.iter().map(|r| r.kind.as_str()).collect();
        assert_eq!(kinds, vec!["command", "mechanism"]);
    }

    #[test]
    fn smart_equal_priority_keeps_corpus_order() {
        let mut first = record("command", "flag");
        first.file = Some("FlagCommand.java".into());
        let mut second = record("command", "flag");
        second.file = Some("OtherFlagCommand.java".into());
        let corpus = vec![first, second];

        let response = search_smart(&corpus, "flag", None);
        let files: Vec<_> = response
            .results
            .iter()
            .map(|r| r.file.as_deref().unwrap())
            .collect();
        assert_eq!(files, vec!["FlagCommand.java", "OtherFlagCommand.java"]);
    }

    #[test]
    fn smart_falls_back_to_suggestion() {
        // "item.displai" earns no score: it is not a prefix, substring or
        // word match of "item.display" (query words keep their dots). The
        // whole-name edit distance of 1 still yields a suggestion.
        let corpus = vec![record("tag", "item.display")];
        let response = search_smart(&corpus, "item.displai", None);
        assert_eq!(response.status, SearchStatus::Suggestion);
        assert_eq!(response.suggestion.as_deref(), Some("item.display"));
    }

    #[test]
    fn smart_near_word_match_still_ranks() {
        // One character off is a near word match (20 - 5 * distance), not a
        // suggestion.
        let corpus = vec![record("command", "flag")];
        let response = search_smart(&corpus, "flg", None);
        assert_eq!(response.status, SearchStatus::Ok);
        assert_eq!(response.results[0].name, "flag");
    }

    #[test]
    fn smart_unrelated_records_are_filtered_out() {
        let corpus = vec![record("command", "note"), record("tag", "blocks_flagged")];
        let response = search_smart(&corpus, "blocks flagged", None);

        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].name, "blocks_flagged");
    }

    #[test]
    fn length_penalty_separates_near_identical_prefix_matches() {
        let corpus = vec![
            record("tag", "flags_with_a_very_long_name"),
            record("tag", "flags"),
        ];
        let response = search_smart(&corpus, "flags", None);

        let names: Vec<_> = response.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names[0], "flags");
    }

    #[test]
    fn search_fields_looks_everywhere() {
        let mut block = record("command", "flag");
        block.set_field("description", "Sets or removes an expiring marker.");
        let corpus = vec![block, record("command", "note")];

        let hits = search_fields(&corpus, "expiring");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "flag");
    }

    #[test]
    fn word_score_prefers_exact_then_near_then_prefix() {
        assert_eq!(word_score("flag", "flag") as i64, 30);
        assert_eq!(word_score("flag", "flags") as i64, 15); // distance 1
        assert_eq!(word_score("flag", "flagged") as i64, 15); // prefix, distance 3
        assert_eq!(word_score("lag", "flagged") as i64, 5); // contains only
        assert_eq!(word_score("flag", "note") as i64, 0);
    }

    proptest! {
        #[test]
        fn edit_distance_is_symmetric(a in r"[a-z]{0,12}", b in r"[a-z]{0,12}") {
            prop_assert_eq!(edit_distance(&a, &b), edit_distance(&b, &a));
        }

        #[test]
        fn edit_distance_of_identical_strings_is_zero(a in r"[a-z]{0,16}") {
            prop_assert_eq!(edit_distance(&a, &a), 0);
        }

        #[test]
        fn edit_distance_bounded_by_longer_length(a in r"[a-z]{0,12}", b in r"[a-z]{0,12}") {
            prop_assert!(edit_distance(&a, &b) <= a.len().max(b.len()));
        }
    }
}
