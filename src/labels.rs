//! Label normalization for notes and inline tag chips.
//!
//! A label is the canonical form of whatever the user typed into a tag
//! field or a `#word` chip: lowercase, `[a-z0-9_-]` only, at most 24
//! characters. Anything that can't be canonicalized is dropped, never
//! partially fixed up - the persistence layer only ever sees labels that
//! already satisfy the pattern.

/// Maximum length of a canonical label.
pub const MAX_LABEL_LEN: usize = 24;

/// Maximum number of labels kept on a single note.
pub const MAX_LABELS_PER_NOTE: usize = 10;

/// Normalize a raw user-typed string into a canonical label.
///
/// Pipeline: trim, lowercase, strip any leading run of `#`, collapse any
/// run of whitespace-or-slash into a single hyphen, collapse hyphen runs.
/// Returns `None` when the result is empty, longer than [`MAX_LABEL_LEN`],
/// or contains a character outside `[a-z0-9_-]`.
///
/// # Examples
///
/// ```
/// use notekit::labels::normalize_label;
///
/// assert_eq!(normalize_label("#Urgent Task"), Some("urgent-task".into()));
/// assert_eq!(normalize_label("bad!char"), None);
/// ```
pub fn normalize_label(value: &str) -> Option<String> {
    let lowered = value.trim().to_lowercase();
    let stripped = lowered.trim_start_matches('#');

    let mut out = String::with_capacity(stripped.len());
    let mut pending_hyphen = false;
    for ch in stripped.chars() {
        if ch.is_whitespace() || ch == '/' || ch == '-' {
            pending_hyphen = true;
            continue;
        }
        if pending_hyphen {
            out.push('-');
            pending_hyphen = false;
        }
        out.push(ch);
    }
    if pending_hyphen {
        out.push('-');
    }

    if out.is_empty() || out.len() > MAX_LABEL_LEN {
        return None;
    }
    if !out
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        return None;
    }
    Some(out)
}

/// Normalize an ordered batch of raw strings into a label set.
///
/// Rejects are dropped, duplicates merge onto the first occurrence, and the
/// result is capped at [`MAX_LABELS_PER_NOTE`] accepted entries.
pub fn normalize_labels<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        let Some(normalized) = normalize_label(value.as_ref()) else {
            continue;
        };
        if out.len() >= MAX_LABELS_PER_NOTE {
            break;
        }
        if !out.contains(&normalized) {
            out.push(normalized);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize_label("work"), Some("work".to_string()));
        assert_eq!(normalize_label("  Work  "), Some("work".to_string()));
        assert_eq!(normalize_label("#work"), Some("work".to_string()));
        assert_eq!(normalize_label("###work"), Some("work".to_string()));
    }

    #[test]
    fn test_normalize_collapses_separators() {
        assert_eq!(
            normalize_label("#Urgent Task"),
            Some("urgent-task".to_string())
        );
        assert_eq!(normalize_label("a / b"), Some("a-b".to_string()));
        assert_eq!(normalize_label("a---b"), Some("a-b".to_string()));
        assert_eq!(normalize_label("a  -  b"), Some("a-b".to_string()));
    }

    #[test]
    fn test_normalize_rejects() {
        assert_eq!(normalize_label(""), None);
        assert_eq!(normalize_label("   "), None);
        assert_eq!(normalize_label("#"), None);
        assert_eq!(normalize_label("bad!char"), None);
        assert_eq!(normalize_label(&"a".repeat(25)), None);
        // 24 chars is still fine
        assert_eq!(normalize_label(&"a".repeat(24)), Some("a".repeat(24)));
    }

    #[test]
    fn test_normalize_idempotent() {
        for raw in ["work", "#Urgent Task", "a/b", "under_score", "x-1-2"] {
            let once = normalize_label(raw).expect("accepted");
            assert_eq!(normalize_label(&once), Some(once.clone()));
        }
    }

    #[test]
    fn test_batch_dedup_and_cap() {
        let raw = [
            "work", "Work", "#work", "rest", "one", "two", "three", "four", "five", "six",
            "seven", "eight", "nine",
        ];
        let labels = normalize_labels(&raw);
        assert_eq!(labels.len(), MAX_LABELS_PER_NOTE);
        // Case-insensitive variants merged onto the first occurrence.
        assert_eq!(labels[0], "work");
        assert_eq!(labels[1], "rest");
        assert_eq!(labels.iter().filter(|l| *l == "work").count(), 1);
    }

    #[test]
    fn test_batch_drops_rejects_without_consuming_slots() {
        let raw = ["ok", "bad!char", "also-ok"];
        assert_eq!(normalize_labels(&raw), vec!["ok", "also-ok"]);
    }
}
