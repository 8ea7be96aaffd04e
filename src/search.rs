//! Note search: query parsing and matching.
//!
//! The search box feeds every keystroke through [`parse_search_filters`],
//! and the resulting [`SearchFilters`] value is applied to snapshots of the
//! stored notes with [`matches_note_search`]. Matching is deliberately plain
//! substring containment - no tokenization, no fuzzy scoring - so a
//! multi-word remainder must appear contiguously in the note.

use crate::labels::normalize_label;

/// Structured filters derived from a free-text query.
///
/// Ephemeral: recomputed on every keystroke, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    /// Free-text remainder, lowercased, terms joined by single spaces.
    pub normalized_text: String,
    /// Required label from a `#label` token. When several are present the
    /// last successfully normalized one wins; earlier ones are discarded.
    pub label_from_query: Option<String>,
    /// Set by an `is:pinned` token.
    pub pinned_only: bool,
}

/// Snapshot of a note's searchable fields. Any field may be absent; absence
/// never excludes a note on its own.
#[derive(Debug, Clone, Default)]
pub struct SearchableNote<'a> {
    pub title: Option<&'a str>,
    pub content: Option<&'a str>,
    pub labels: &'a [String],
    pub pinned: bool,
}

/// Parse a free-text query into structured filters.
///
/// Tokens: `is:pinned` sets the pinned flag, `#label` tokens run through
/// the label normalizer (last accepted wins), everything else is kept as a
/// text term. Total: malformed tokens degrade to omission.
pub fn parse_search_filters(query: &str) -> SearchFilters {
    let mut filters = SearchFilters::default();
    let mut text_parts: Vec<&str> = Vec::new();

    let lowered = query.trim().to_lowercase();
    for token in lowered.split_whitespace() {
        if token == "is:pinned" {
            filters.pinned_only = true;
            continue;
        }
        if token.starts_with('#') {
            if let Some(label) = normalize_label(token) {
                filters.label_from_query = Some(label);
            }
            continue;
        }
        text_parts.push(token);
    }

    filters.normalized_text = text_parts.join(" ");
    filters
}

/// Apply parsed filters to a note snapshot.
///
/// Short-circuit order: pinned gate, label gate, empty remainder matches,
/// then substring containment over `title\ncontent\nlabels`.
pub fn matches_note_search(note: &SearchableNote, filters: &SearchFilters) -> bool {
    if filters.pinned_only && !note.pinned {
        return false;
    }

    let labels: Vec<String> = note.labels.iter().map(|l| l.to_lowercase()).collect();

    if let Some(required) = &filters.label_from_query {
        if !labels.iter().any(|l| l == required) {
            return false;
        }
    }

    if filters.normalized_text.is_empty() {
        return true;
    }

    let haystack = format!(
        "{}\n{}\n{}",
        note.title.unwrap_or_default().to_lowercase(),
        note.content.unwrap_or_default().to_lowercase(),
        labels.join(" ")
    );
    haystack.contains(&filters.normalized_text)
}

/// Single-line preview of a note body for list rows.
pub fn note_preview(content: Option<&str>) -> String {
    let normalized = content
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if normalized.is_empty() {
        "No content yet".to_string()
    } else {
        normalized
    }
}
