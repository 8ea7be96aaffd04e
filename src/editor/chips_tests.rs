//! Integration-style tests for the tag-chip engine and the slash-command
//! palette, driven through the public editor commands.

use super::chips::{
    apply_hash_tag_rule, empty_chip_positions, insert_tag_chip, move_out_of_chip,
    resolve_color_alias, set_tag_chip_color,
};
use super::palette::{
    active_query_span, filter_commands, CommandAction, PaletteKey, PaletteOutcome, PopupHost,
    ScreenRect, SuggestionController, COMMANDS,
};
use super::{Direction, Editor, InlineRange, Selection};
use crate::config::Config;
use crate::document::{BlockKind, ChipColor, Inline, TagChip};

fn chip_at(editor: &Editor, block: usize, index: usize) -> &TagChip {
    match &editor.doc.blocks[block].content[index] {
        Inline::Chip(chip) => chip,
        other => panic!("expected chip at ({block}, {index}), got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Color aliases
// ---------------------------------------------------------------------------

#[test]
fn test_color_alias_table() {
    assert_eq!(resolve_color_alias("red"), ChipColor::Red);
    assert_eq!(resolve_color_alias("r"), ChipColor::Red);
    assert_eq!(resolve_color_alias("urgent"), ChipColor::Red);
    assert_eq!(resolve_color_alias("yellow"), ChipColor::Yellow);
    assert_eq!(resolve_color_alias("y"), ChipColor::Yellow);
    assert_eq!(resolve_color_alias("wait"), ChipColor::Yellow);
    assert_eq!(resolve_color_alias("green"), ChipColor::Green);
    assert_eq!(resolve_color_alias("g"), ChipColor::Green);
    assert_eq!(resolve_color_alias("done"), ChipColor::Green);
    // Legacy and unrecognized names collapse onto accent.
    assert_eq!(resolve_color_alias("blue"), ChipColor::Accent);
    assert_eq!(resolve_color_alias("purple"), ChipColor::Accent);
    assert_eq!(resolve_color_alias("accent"), ChipColor::Accent);
    assert_eq!(resolve_color_alias("xyz"), ChipColor::Accent);
    assert_eq!(resolve_color_alias("  Wait "), ChipColor::Yellow);
}

// ---------------------------------------------------------------------------
// Recognize-by-typing
// ---------------------------------------------------------------------------

#[test]
fn test_typing_hash_word_produces_chip() {
    let mut editor = Editor::new();
    editor.insert_text("#wait ");
    let chip = chip_at(&editor, 0, 0);
    assert_eq!(chip.color, ChipColor::Yellow);
    assert_eq!(chip.text, "wait");
    // One space reinserted after the chip; caret lands after it.
    assert_eq!(editor.doc.to_plain_text(), "#wait ");
    assert_eq!(editor.selection, Selection::caret(0, 7));
}

#[test]
fn test_typing_unknown_word_defaults_to_accent() {
    let mut editor = Editor::new();
    editor.insert_text("#xyz ");
    assert_eq!(chip_at(&editor, 0, 0).color, ChipColor::Accent);
}

#[test]
fn test_hash_rule_preserves_leading_space() {
    let mut editor = Editor::from_plain_text("note");
    editor.insert_text(" #urgent ");
    assert_eq!(editor.doc.to_plain_text(), "note #urgent ");
    let chip = chip_at(&editor, 0, 1);
    assert_eq!(chip.color, ChipColor::Red);
    assert_eq!(chip.text, "urgent");
    // "note " then chip spanning [5, 13) then the reinserted space.
    assert_eq!(editor.selection, Selection::caret(0, 14));
}

#[test]
fn test_hash_rule_requires_word_boundary() {
    let mut editor = Editor::from_plain_text("ab");
    editor.insert_text("#tag ");
    // "ab#tag " has no whitespace before the marker: no chip.
    assert!(editor.doc.chip_positions().is_empty());
    assert_eq!(editor.doc.to_plain_text(), "ab#tag ");
}

#[test]
fn test_hash_rule_needs_trailing_whitespace() {
    let mut editor = Editor::new();
    editor.insert_text("#wait");
    assert!(editor.doc.chip_positions().is_empty());
    // The explicit rule entry point agrees.
    assert!(!apply_hash_tag_rule(&mut editor));
}

#[test]
fn test_hash_rule_does_not_fire_after_chip_without_space() {
    let mut editor = Editor::new();
    editor.insert_text("#done ");
    // Remove the separating space so the text run starts right at the
    // chip's close boundary, then type another pattern.
    let chip_end = 6; // "done" + 2 boundary tokens
    editor.delete_range(InlineRange {
        block: 0,
        from: chip_end,
        to: chip_end + 1,
    });
    editor.set_caret(0, chip_end);
    editor.insert_text("#x ");
    assert_eq!(editor.doc.chip_positions().len(), 1);
}

// ---------------------------------------------------------------------------
// Explicit insert
// ---------------------------------------------------------------------------

#[test]
fn test_insert_defaults_and_inner_selection() {
    let mut editor = Editor::new();
    insert_tag_chip(&mut editor, None, None);
    let chip = chip_at(&editor, 0, 0);
    assert_eq!(chip.color, ChipColor::Accent);
    assert_eq!(chip.text, "tag");
    // Empty block: no prefix space, trailing space added, inner text
    // selected for immediate retyping.
    assert_eq!(editor.doc.to_plain_text(), "#tag ");
    assert_eq!(
        editor.selection,
        Selection {
            block: 0,
            anchor: 1,
            head: 4,
        }
    );
}

#[test]
fn test_insert_uses_configured_default_color() {
    let config = Config {
        default_chip_color: ChipColor::Green,
        ..Config::default()
    };
    let mut editor = Editor::with_config(&config);
    insert_tag_chip(&mut editor, None, None);
    assert_eq!(chip_at(&editor, 0, 0).color, ChipColor::Green);
    // An explicit color still wins over the configured default.
    let mut editor = Editor::with_config(&config);
    insert_tag_chip(&mut editor, Some(ChipColor::Red), None);
    assert_eq!(chip_at(&editor, 0, 0).color, ChipColor::Red);
}

#[test]
fn test_insert_adds_spacers_against_text() {
    let mut editor = Editor::from_plain_text("ab");
    insert_tag_chip(&mut editor, Some(ChipColor::Green), Some("go"));
    // Prefix space (caret touched 'b') and suffix space (end of block).
    assert_eq!(editor.doc.to_plain_text(), "ab #go ");
    assert_eq!(chip_at(&editor, 0, 1).color, ChipColor::Green);
}

#[test]
fn test_insert_skips_spacers_next_to_whitespace() {
    let mut editor = Editor::from_plain_text("a  b");
    editor.set_caret(0, 2);
    insert_tag_chip(&mut editor, None, Some("x"));
    assert_eq!(editor.doc.to_plain_text(), "a #x b");
}

#[test]
fn test_insert_replaces_selection() {
    let mut editor = Editor::from_plain_text("pick me");
    editor.set_selection(0, 5, 7);
    insert_tag_chip(&mut editor, None, Some("me"));
    assert_eq!(editor.doc.to_plain_text(), "pick #me ");
}

#[test]
fn test_retyping_selected_body_renames_chip() {
    let mut editor = Editor::new();
    insert_tag_chip(&mut editor, None, None);
    // Inner text is selected; typing replaces it inside the chip.
    editor.insert_text("todo");
    let chip = chip_at(&editor, 0, 0);
    assert_eq!(chip.text, "todo");
}

// ---------------------------------------------------------------------------
// Recolor
// ---------------------------------------------------------------------------

#[test]
fn test_recolor_inside_chip() {
    let mut editor = Editor::new();
    insert_tag_chip(&mut editor, None, None);
    assert!(set_tag_chip_color(&mut editor, ChipColor::Red));
    assert_eq!(chip_at(&editor, 0, 0).color, ChipColor::Red);
    assert_eq!(chip_at(&editor, 0, 0).text, "tag");
}

#[test]
fn test_recolor_outside_chip_is_noop() {
    let mut editor = Editor::from_plain_text("plain");
    assert!(!set_tag_chip_color(&mut editor, ChipColor::Red));
    assert_eq!(editor.doc.to_plain_text(), "plain");
}

// ---------------------------------------------------------------------------
// Boundary navigation
// ---------------------------------------------------------------------------

#[test]
fn test_exit_right_inserts_space_before_text() {
    let mut editor = Editor::new();
    editor.insert_text("#go ");
    editor.insert_text("x");
    // Chip "go" spans [0, 4); delete the separating space at 4.
    editor.delete_range(InlineRange {
        block: 0,
        from: 4,
        to: 5,
    });
    editor.set_caret(0, 3); // inner end of the chip
    assert!(move_out_of_chip(&mut editor, Direction::Right));
    assert_eq!(editor.doc.to_plain_text(), "#go x");
    assert_eq!(editor.selection, Selection::caret(0, 5));
    // The char just outside the exited edge is whitespace.
    assert_eq!(editor.current_block().char_at(4), Some(' '));
}

#[test]
fn test_exit_right_at_block_end_inserts_space() {
    let mut editor = Editor::new();
    editor.insert_text("#go ");
    editor.delete_range(InlineRange {
        block: 0,
        from: 4,
        to: 5,
    });
    editor.set_caret(0, 3);
    assert!(move_out_of_chip(&mut editor, Direction::Right));
    assert_eq!(editor.doc.to_plain_text(), "#go ");
    assert_eq!(editor.selection, Selection::caret(0, 5));
}

#[test]
fn test_exit_right_over_existing_space() {
    let mut editor = Editor::new();
    editor.insert_text("#go ");
    editor.set_caret(0, 3);
    assert!(move_out_of_chip(&mut editor, Direction::Right));
    // No second space; caret lands after the existing one.
    assert_eq!(editor.doc.to_plain_text(), "#go ");
    assert_eq!(editor.selection, Selection::caret(0, 5));
}

#[test]
fn test_exit_left_inserts_space_after_text() {
    let mut editor = Editor::from_plain_text("a");
    insert_tag_chip(&mut editor, None, Some("t"));
    // "a #t " with chip spanning [2, 5); put the caret at the inner start
    // after removing the prefix space.
    editor.delete_range(InlineRange {
        block: 0,
        from: 1,
        to: 2,
    });
    editor.set_caret(0, 2);
    assert!(move_out_of_chip(&mut editor, Direction::Left));
    assert_eq!(editor.doc.to_plain_text(), "a #t ");
    assert_eq!(editor.selection, Selection::caret(0, 1));
    // Chip now starts at 2; the char abutting it is the new space.
    assert_eq!(editor.current_block().char_at(1), Some(' '));
}

#[test]
fn test_exit_left_at_block_start_inserts_space() {
    let mut editor = Editor::new();
    insert_tag_chip(&mut editor, None, Some("t"));
    editor.set_caret(0, 1);
    assert!(move_out_of_chip(&mut editor, Direction::Left));
    assert_eq!(editor.doc.to_plain_text(), " #t ");
    assert_eq!(editor.selection, Selection::caret(0, 0));
}

#[test]
fn test_exit_not_handled_mid_chip() {
    let mut editor = Editor::new();
    insert_tag_chip(&mut editor, None, None); // body "tag"
    editor.set_caret(0, 2); // between 't' and 'a'
    assert!(!move_out_of_chip(&mut editor, Direction::Left));
    assert!(!move_out_of_chip(&mut editor, Direction::Right));
}

#[test]
fn test_exit_not_handled_outside_chip() {
    let mut editor = Editor::from_plain_text("plain");
    editor.set_caret(0, 3);
    assert!(!move_out_of_chip(&mut editor, Direction::Left));
}

// ---------------------------------------------------------------------------
// Cleanup invariant
// ---------------------------------------------------------------------------

#[test]
fn test_emptied_chip_is_removed() {
    let mut editor = Editor::new();
    insert_tag_chip(&mut editor, None, None);
    // Delete the selected inner text; the emptied chip must not survive
    // the edit.
    let (from, to) = (editor.selection.from_offset(), editor.selection.to_offset());
    editor.delete_range(InlineRange {
        block: 0,
        from,
        to,
    });
    assert!(editor.doc.chip_positions().is_empty());
    assert_eq!(editor.doc.to_plain_text(), " ");
}

#[test]
fn test_whitespace_only_chip_counts_as_empty() {
    let mut editor = Editor::new();
    editor
        .current_block_mut()
        .content
        .push(Inline::Chip(TagChip::new(ChipColor::Red, " \t ")));
    assert_eq!(empty_chip_positions(&editor.doc), vec![(0, 0)]);
}

#[test]
fn test_cleanup_deletes_back_to_front() {
    let mut editor = Editor::new();
    let block = editor.current_block_mut();
    block.content.push(Inline::Chip(TagChip::new(ChipColor::Accent, "")));
    block.content.push(Inline::Text(" keep ".into()));
    block.content.push(Inline::Chip(TagChip::new(ChipColor::Accent, "stay")));
    block.content.push(Inline::Chip(TagChip::new(ChipColor::Accent, "")));
    editor.set_caret(0, 0);
    editor.insert_text("x");
    assert_eq!(editor.doc.chip_positions().len(), 1);
    assert_eq!(editor.doc.to_plain_text(), "x keep #stay");
}

// ---------------------------------------------------------------------------
// Palette filter
// ---------------------------------------------------------------------------

#[test]
fn test_filter_includes_title_and_alias_substrings() {
    for item in COMMANDS {
        let by_title = filter_commands(COMMANDS, item.title);
        assert!(
            by_title.iter().any(|m| m.title == item.title),
            "title query '{}' should include the item",
            item.title
        );
        for alias in item.aliases {
            let by_alias = filter_commands(COMMANDS, alias);
            assert!(
                by_alias.iter().any(|m| m.title == item.title),
                "alias query '{}' should include '{}'",
                alias,
                item.title
            );
        }
    }
}

#[test]
fn test_filter_preserves_catalog_order() {
    let matches = filter_commands(COMMANDS, "list");
    let titles: Vec<&str> = matches.iter().map(|m| m.title).collect();
    assert_eq!(titles, vec!["Bullet List", "Numbered List", "Task List"]);
}

#[test]
fn test_filter_no_match_is_empty() {
    assert!(filter_commands(COMMANDS, "zzzz").is_empty());
}

#[test]
fn test_filter_empty_query_returns_all() {
    assert_eq!(filter_commands(COMMANDS, "").len(), COMMANDS.len());
}

#[test]
fn test_filter_is_case_insensitive() {
    let matches = filter_commands(COMMANDS, "HEADING");
    assert_eq!(matches.len(), 3);
}

// ---------------------------------------------------------------------------
// Palette lifecycle
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RecordingHost {
    events: Vec<String>,
}

impl PopupHost for &mut RecordingHost {
    fn mount(&mut self, _rect: ScreenRect) {
        self.events.push("mount".into());
    }
    fn set_position(&mut self, _rect: ScreenRect) {
        self.events.push("set_position".into());
    }
    fn hide(&mut self) {
        self.events.push("hide".into());
    }
    fn destroy(&mut self) {
        self.events.push("destroy".into());
    }
}

fn rect() -> Option<ScreenRect> {
    Some(ScreenRect {
        x: 10.0,
        y: 20.0,
        width: 4.0,
        height: 16.0,
    })
}

#[test]
fn test_slash_query_span_tracking() {
    let mut editor = Editor::new();
    editor.insert_text("/");
    let (range, query) = active_query_span(&editor).expect("span open");
    assert_eq!(query, "");
    assert_eq!(range, InlineRange { block: 0, from: 0, to: 1 });

    editor.insert_text("h1");
    let (range, query) = active_query_span(&editor).expect("span live");
    assert_eq!(query, "h1");
    assert_eq!(range.to, 3);

    // Whitespace abandons the span.
    editor.insert_text(" ");
    assert!(active_query_span(&editor).is_none());
}

#[test]
fn test_slash_mid_word_does_not_open() {
    let mut editor = Editor::from_plain_text("a");
    editor.insert_text("/x");
    assert!(active_query_span(&editor).is_none());
}

#[test]
fn test_lifecycle_commit_heading() {
    let mut host = RecordingHost::default();
    let mut editor = Editor::new();
    {
        let mut controller = SuggestionController::new(&mut host);
        editor.insert_text("/");
        controller.sync(&editor, rect());
        editor.insert_text("h1");
        controller.sync(&editor, rect());
        assert_eq!(controller.filtered_items().len(), 1);
        assert_eq!(controller.selected_item().unwrap().title, "Heading 1");

        assert!(controller.on_key_down(PaletteKey::Enter, &mut editor));
        assert_eq!(controller.take_outcome(), Some(PaletteOutcome::Applied));
        // Committing removed the query span; reconcile closes the popup.
        controller.sync(&editor, rect());
    }
    assert_eq!(editor.current_block().kind, BlockKind::Heading(1));
    assert_eq!(editor.doc.to_plain_text(), "");
    assert_eq!(host.events, vec!["mount", "set_position", "destroy"]);
}

#[test]
fn test_lifecycle_tag_command_inserts_chip() {
    let mut host = RecordingHost::default();
    let mut editor = Editor::new();
    let mut controller = SuggestionController::new(&mut host);
    editor.insert_text("/tag-red");
    controller.sync(&editor, rect());
    assert_eq!(controller.selected_item().unwrap().title, "Tag Red");
    assert!(controller.on_key_down(PaletteKey::Tab, &mut editor));
    let chip = chip_at(&editor, 0, 0);
    assert_eq!(chip.color, ChipColor::Red);
    assert_eq!(chip.text, "tag");
}

#[test]
fn test_lifecycle_escape_hides_and_consumes() {
    let mut host = RecordingHost::default();
    let mut editor = Editor::new();
    let mut controller = SuggestionController::new(&mut host);
    editor.insert_text("/");
    controller.sync(&editor, rect());
    assert!(controller.on_key_down(PaletteKey::Escape, &mut editor));
    assert!(host.events.contains(&"hide".to_string()));
}

#[test]
fn test_lifecycle_arrows_wrap_selection() {
    let mut host = RecordingHost::default();
    let mut editor = Editor::new();
    let mut controller = SuggestionController::new(&mut host);
    editor.insert_text("/");
    controller.sync(&editor, rect());
    let total = COMMANDS.len();
    assert_eq!(controller.selected_item().unwrap().title, COMMANDS[0].title);
    assert!(controller.on_key_down(PaletteKey::Up, &mut editor));
    assert_eq!(
        controller.selected_item().unwrap().title,
        COMMANDS[total - 1].title
    );
    assert!(controller.on_key_down(PaletteKey::Down, &mut editor));
    assert_eq!(controller.selected_item().unwrap().title, COMMANDS[0].title);
    assert!(!controller.on_key_down(PaletteKey::Other, &mut editor));
}

#[test]
fn test_lifecycle_missing_rect_skips_mount() {
    let mut host = RecordingHost::default();
    let mut editor = Editor::new();
    {
        let mut controller = SuggestionController::new(&mut host);
        editor.insert_text("/");
        controller.sync(&editor, None);
        assert!(controller.is_active());
        // Rect becomes available on a later cycle: mount then.
        editor.insert_text("h");
        controller.sync(&editor, rect());
        controller.on_exit();
    }
    assert_eq!(host.events, vec!["mount", "destroy"]);
}

#[test]
fn test_lifecycle_exit_without_mount_is_safe() {
    let mut host = RecordingHost::default();
    let mut controller = SuggestionController::new(&mut host);
    controller.on_exit();
    assert!(host.events.is_empty());
}

#[test]
fn test_date_command_requests_picker() {
    let mut host = RecordingHost::default();
    let mut editor = Editor::new();
    let mut controller = SuggestionController::new(&mut host);
    editor.insert_text("/date");
    controller.sync(&editor, rect());
    assert_eq!(controller.selected_item().unwrap().title, "Date");
    assert!(controller.on_key_down(PaletteKey::Enter, &mut editor));
    assert_eq!(
        controller.take_outcome(),
        Some(PaletteOutcome::DatePickerRequested)
    );
    assert_eq!(editor.doc.to_plain_text(), "");
}

#[test]
fn test_plain_tag_command_honors_default_color() {
    let config = Config {
        default_chip_color: ChipColor::Yellow,
        ..Config::default()
    };
    let mut editor = Editor::with_config(&config);
    editor.insert_text("/");
    let (range, _) = active_query_span(&editor).unwrap();
    let plain_tag = COMMANDS.iter().find(|c| c.title == "Tag").unwrap();
    plain_tag.action.apply(&mut editor, range);
    assert_eq!(chip_at(&editor, 0, 0).color, ChipColor::Yellow);
    // The explicitly colored variants ignore the configured default.
    assert_eq!(
        COMMANDS
            .iter()
            .find(|c| c.title == "Tag Red")
            .unwrap()
            .action,
        CommandAction::InsertOrRecolorTag(Some(ChipColor::Red))
    );
}

#[test]
fn test_command_action_divider() {
    let mut editor = Editor::new();
    editor.insert_text("/hr");
    let (range, _) = active_query_span(&editor).unwrap();
    CommandAction::InsertDivider.apply(&mut editor, range);
    assert!(editor
        .doc
        .blocks
        .iter()
        .any(|b| b.kind == BlockKind::Divider));
}
