//! Inline tag-chip engine.
//!
//! Chips enter the document two ways: the explicit insert command (used by
//! the palette's Tag actions) and the typed-pattern rule that rewrites
//! `#word ` into a chip. Arrow keys escape a chip at its inner edges, and
//! a space is inserted on exit whenever the landing spot would abut
//! non-whitespace, so a chip is never glued to visible text and the
//! `#word` pattern stays re-parseable on later edits.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::document::{ChipColor, Doc, Inline, TagChip};
use crate::editor::{Direction, Editor, Selection};

/// Default body for a chip inserted without explicit text.
pub const DEFAULT_CHIP_TEXT: &str = "tag";

/// Map a typed word onto a chip color. Color names, single-letter
/// shorthand, and the urgency aliases resolve; legacy `blue`/`purple` and
/// anything unrecognized collapse onto `Accent`.
pub fn resolve_color_alias(input: &str) -> ChipColor {
    match input.trim().to_lowercase().as_str() {
        "red" | "r" | "urgent" => ChipColor::Red,
        "yellow" | "y" | "wait" => ChipColor::Yellow,
        "green" | "g" | "done" => ChipColor::Green,
        _ => ChipColor::Accent,
    }
}

fn hash_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?:^|\s)#(\w+)\s$").expect("valid hash tag pattern"))
}

/// Insert a chip at the current selection. A missing color falls back to
/// the editor's configured default.
///
/// The characters flanking the selection decide spacing: a leading space
/// is added when the preceding character exists and is not whitespace, a
/// trailing space when the following character is absent or not
/// whitespace. The chip's body text is selected afterwards so the user can
/// immediately retype it.
pub fn insert_tag_chip(editor: &mut Editor, color: Option<ChipColor>, text: Option<&str>) {
    let body = text.unwrap_or(DEFAULT_CHIP_TEXT);
    let color = color.unwrap_or(editor.default_chip_color);

    if !editor.selection.is_empty() {
        let (from, to) = (
            editor.selection.from_offset(),
            editor.selection.to_offset(),
        );
        editor.current_block_mut().delete(from, to);
        editor.selection = Selection::caret(editor.selection.block, from);
    }

    let at = editor.selection.head;
    let block = editor.current_block_mut();
    let char_before = if at > 0 { block.char_at(at - 1) } else { None };
    let char_after = block.char_at(at);
    let needs_prefix = char_before.is_some_and(|c| !c.is_whitespace());
    let needs_suffix = !char_after.is_some_and(char::is_whitespace);

    let mut chip_start = at;
    if needs_prefix {
        block.insert_text(chip_start, " ");
        chip_start += 1;
    }
    block.insert_inline(chip_start, Inline::Chip(TagChip::new(color, body)));
    let inner_len = body.chars().count();
    if needs_suffix {
        block.insert_text(chip_start + inner_len + 2, " ");
    }

    editor.selection = Selection {
        block: editor.selection.block,
        anchor: chip_start + 1,
        head: chip_start + 1 + inner_len,
    };
    debug!(?color, body, "inserted tag chip");
    editor.run_cleanup();
}

/// Recolor the chip under the caret. Returns false (not handled) when the
/// caret is not inside a chip, so default editor behavior proceeds.
pub fn set_tag_chip_color(editor: &mut Editor, color: ChipColor) -> bool {
    let head = editor.selection.head;
    let Some(chip_ref) = editor.current_block().chip_containing(head) else {
        return false;
    };
    if let Some(Inline::Chip(chip)) = editor
        .current_block_mut()
        .content
        .get_mut(chip_ref.index)
    {
        chip.color = color;
        debug!(?color, "recolored tag chip");
        return true;
    }
    false
}

/// Arrow-key escape from a chip's inner edge.
///
/// Returns false when the selection is not a caret at the matching inner
/// edge of a chip; the caller should fall through to default cursor
/// movement. On exit, a single space is inserted first whenever the caret
/// would otherwise land against non-whitespace (or, on the right, past the
/// end of the block), so the character just outside an exited chip edge is
/// always whitespace or a boundary.
pub fn move_out_of_chip(editor: &mut Editor, direction: Direction) -> bool {
    if !editor.selection.is_empty() {
        return false;
    }
    let head = editor.selection.head;
    let Some(chip_ref) = editor.current_block().chip_containing(head) else {
        return false;
    };

    match direction {
        Direction::Left => {
            if chip_ref.inner_offset != 0 {
                return false;
            }
            let target = chip_ref.start;
            let prev = if target > 0 {
                editor.current_block().char_at(target - 1)
            } else {
                None
            };
            if !prev.is_some_and(char::is_whitespace) {
                editor.current_block_mut().insert_text(target, " ");
            }
            editor.selection = Selection::caret(editor.selection.block, target);
        }
        Direction::Right => {
            if chip_ref.inner_offset != chip_ref.inner_len {
                return false;
            }
            let target = chip_ref.start + chip_ref.inner_len + 2;
            let next = editor.current_block().char_at(target);
            if !next.is_some_and(char::is_whitespace) {
                editor.current_block_mut().insert_text(target, " ");
            }
            editor.selection = Selection::caret(editor.selection.block, target + 1);
        }
    }
    editor.run_cleanup();
    true
}

/// Typed-pattern recognition: rewrite a just-completed `#word ` into a
/// chip colored by the alias table, keeping the optional leading space and
/// reinserting one space after the chip so typing continues outside it.
///
/// Evaluated against the contiguous plain-text run ending at the caret,
/// so the pattern never fires inside a chip body. Returns whether a chip
/// was produced.
pub fn apply_hash_tag_rule(editor: &mut Editor) -> bool {
    if !editor.selection.is_empty() {
        return false;
    }
    let head = editor.selection.head;
    let (run, run_start) = editor.current_block().text_run_ending_at(head);
    let Some(captures) = hash_tag_pattern().captures(&run) else {
        return false;
    };
    let full = captures.get(0).expect("whole match");
    // A match anchored at the run's start only counts as start-of-line
    // when the run really begins the block.
    let has_leading_space = full
        .as_str()
        .chars()
        .next()
        .is_some_and(char::is_whitespace);
    if !has_leading_space && run_start != 0 {
        return false;
    }

    let word = captures.get(1).expect("tag word").as_str().to_string();
    let color = resolve_color_alias(&word);

    let match_from = run_start + run[..full.start()].chars().count();
    let match_to = run_start + run[..full.end()].chars().count();
    let chip_start = if has_leading_space {
        match_from + 1
    } else {
        match_from
    };

    let block_idx = editor.selection.block;
    let block = &mut editor.doc.blocks[block_idx];
    block.delete(chip_start, match_to);
    block.insert_inline(chip_start, Inline::Chip(TagChip::new(color, word.clone())));
    let chip_end = chip_start + word.chars().count() + 2;
    block.insert_text(chip_end, " ");
    editor.selection = Selection::caret(block_idx, chip_end + 1);

    debug!(word, ?color, "hash tag rule produced chip");
    true
}

/// Pure invariant pass: positions of chips whose trimmed body is empty,
/// in document order, independent of whatever produced the snapshot.
pub fn empty_chip_positions(doc: &Doc) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for (b, block) in doc.blocks.iter().enumerate() {
        for (i, inline) in block.content.iter().enumerate() {
            if let Inline::Chip(chip) = inline {
                if chip.text.trim().is_empty() {
                    out.push((b, i));
                }
            }
        }
    }
    out
}
