//! Slash-command palette: a fixed catalog of editor actions, a
//! lowercased-substring filter over titles and aliases, and the floating
//! popup lifecycle that tracks the `/query` span at the caret.
//!
//! Filtering is inclusion-only: matches keep catalog order and there is no
//! relevance ranking (a prefix match and a mid-string match are treated
//! identically, as the product behaves today).

use chrono::Local;
use tracing::debug;

use crate::document::{BlockKind, ChipColor};
use crate::editor::{chips, Editor, InlineRange};

/// Icon reference for a palette row. Purely declarative; rendering is the
/// host's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandIcon {
    Pilcrow,
    Heading1,
    Heading2,
    Heading3,
    List,
    ListOrdered,
    ListTodo,
    Tag,
    Quote,
    Code,
    Minus,
    CalendarDays,
    Sun,
}

/// What a palette item does when committed against the tracked range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
    SetParagraph,
    SetHeading(u8),
    ToggleBulletList,
    ToggleNumberedList,
    ToggleTaskList,
    /// Recolor the chip under the caret, or insert a fresh one. `None`
    /// uses the editor's configured default color.
    InsertOrRecolorTag(Option<ChipColor>),
    ToggleBlockquote,
    ToggleCodeBlock,
    InsertDivider,
    OpenDatePicker,
    InsertToday,
}

/// Side effect a committed action asks of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteOutcome {
    Applied,
    /// The host should open its date picker at the caret.
    DatePickerRequested,
}

impl CommandAction {
    /// Delete the query span, then perform the action. Total: malformed
    /// ranges degrade to a plain span delete.
    pub fn apply(&self, editor: &mut Editor, range: InlineRange) -> PaletteOutcome {
        editor.delete_range(range);
        match self {
            CommandAction::SetParagraph => editor.set_block_kind(BlockKind::Paragraph),
            CommandAction::SetHeading(level) => editor.set_block_kind(BlockKind::Heading(*level)),
            CommandAction::ToggleBulletList => editor.toggle_block_kind(BlockKind::BulletList),
            CommandAction::ToggleNumberedList => {
                editor.toggle_block_kind(BlockKind::NumberedList)
            }
            CommandAction::ToggleTaskList => editor.toggle_block_kind(BlockKind::TaskList),
            CommandAction::InsertOrRecolorTag(color) => {
                let color = color.unwrap_or(editor.default_chip_color);
                if !chips::set_tag_chip_color(editor, color) {
                    chips::insert_tag_chip(editor, Some(color), None);
                }
            }
            CommandAction::ToggleBlockquote => editor.toggle_block_kind(BlockKind::Blockquote),
            CommandAction::ToggleCodeBlock => editor.toggle_block_kind(BlockKind::CodeBlock),
            CommandAction::InsertDivider => editor.insert_divider(),
            CommandAction::OpenDatePicker => return PaletteOutcome::DatePickerRequested,
            CommandAction::InsertToday => {
                let today = Local::now().format("%Y-%m-%d").to_string();
                editor.insert_text(&today);
            }
        }
        PaletteOutcome::Applied
    }
}

/// Static catalog entry. Items are filtered, never mutated.
#[derive(Debug, Clone, Copy)]
pub struct CommandItem {
    pub title: &'static str,
    pub description: &'static str,
    pub icon: CommandIcon,
    pub aliases: &'static [&'static str],
    pub action: CommandAction,
}

/// The fixed, ordered command catalog.
pub const COMMANDS: &[CommandItem] = &[
    CommandItem {
        title: "Text",
        description: "Just start typing with plain text",
        icon: CommandIcon::Pilcrow,
        aliases: &["p", "paragraph"],
        action: CommandAction::SetParagraph,
    },
    CommandItem {
        title: "Heading 1",
        description: "Big section heading",
        icon: CommandIcon::Heading1,
        aliases: &["h1", "big", "large"],
        action: CommandAction::SetHeading(1),
    },
    CommandItem {
        title: "Heading 2",
        description: "Medium section heading",
        icon: CommandIcon::Heading2,
        aliases: &["h2", "medium"],
        action: CommandAction::SetHeading(2),
    },
    CommandItem {
        title: "Heading 3",
        description: "Small section heading",
        icon: CommandIcon::Heading3,
        aliases: &["h3", "small"],
        action: CommandAction::SetHeading(3),
    },
    CommandItem {
        title: "Bullet List",
        description: "Create a simple bullet list",
        icon: CommandIcon::List,
        aliases: &["ul", "bullets", "list"],
        action: CommandAction::ToggleBulletList,
    },
    CommandItem {
        title: "Numbered List",
        description: "Create a numbered list",
        icon: CommandIcon::ListOrdered,
        aliases: &["ol", "numbers", "1", "list"],
        action: CommandAction::ToggleNumberedList,
    },
    CommandItem {
        title: "Task List",
        description: "Track tasks with a checklist",
        icon: CommandIcon::ListTodo,
        aliases: &["todo", "check", "task"],
        action: CommandAction::ToggleTaskList,
    },
    CommandItem {
        title: "Tag",
        description: "Insert an inline editable tag chip",
        icon: CommandIcon::Tag,
        aliases: &["tag", "chip", "label"],
        action: CommandAction::InsertOrRecolorTag(None),
    },
    CommandItem {
        title: "Tag Indigo",
        description: "Insert or recolor tag to indigo",
        icon: CommandIcon::Tag,
        aliases: &["tag-indigo", "indigo-tag", "tagindigo"],
        action: CommandAction::InsertOrRecolorTag(Some(ChipColor::Accent)),
    },
    CommandItem {
        title: "Tag Green",
        description: "Insert or recolor tag to green",
        icon: CommandIcon::Tag,
        aliases: &["tag-green", "green-tag", "taggreen"],
        action: CommandAction::InsertOrRecolorTag(Some(ChipColor::Green)),
    },
    CommandItem {
        title: "Tag Yellow",
        description: "Insert or recolor tag to yellow",
        icon: CommandIcon::Tag,
        aliases: &["tag-yellow", "yellow-tag", "tagyellow"],
        action: CommandAction::InsertOrRecolorTag(Some(ChipColor::Yellow)),
    },
    CommandItem {
        title: "Tag Red",
        description: "Insert or recolor tag to red",
        icon: CommandIcon::Tag,
        aliases: &["tag-red", "red-tag", "tagred"],
        action: CommandAction::InsertOrRecolorTag(Some(ChipColor::Red)),
    },
    CommandItem {
        title: "Quote",
        description: "Capture a quote",
        icon: CommandIcon::Quote,
        aliases: &["blockquote", "quote"],
        action: CommandAction::ToggleBlockquote,
    },
    CommandItem {
        title: "Code Block",
        description: "Display code with syntax highlighting",
        icon: CommandIcon::Code,
        aliases: &["code", "pre", "snippet"],
        action: CommandAction::ToggleCodeBlock,
    },
    CommandItem {
        title: "Divider",
        description: "Visually divide blocks",
        icon: CommandIcon::Minus,
        aliases: &["hr", "line", "divider", "separator"],
        action: CommandAction::InsertDivider,
    },
    CommandItem {
        title: "Date",
        description: "Pick a date to insert",
        icon: CommandIcon::CalendarDays,
        aliases: &["date", "calendar"],
        action: CommandAction::OpenDatePicker,
    },
    CommandItem {
        title: "Today",
        description: "Insert today's date instantly",
        icon: CommandIcon::Sun,
        aliases: &["today", "now"],
        action: CommandAction::InsertToday,
    },
];

/// Filter the catalog by lowercased substring over title or any alias,
/// preserving catalog order among matches.
pub fn filter_commands<'a>(items: &'a [CommandItem], query: &str) -> Vec<&'a CommandItem> {
    let query = query.to_lowercase();
    items
        .iter()
        .filter(|item| command_matches(item, &query))
        .collect()
}

fn command_matches(item: &CommandItem, query_lower: &str) -> bool {
    item.title.to_lowercase().contains(query_lower)
        || item
            .aliases
            .iter()
            .any(|alias| alias.to_lowercase().contains(query_lower))
}

/// Screen rectangle of the query span, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Floating popup collaborator. Mounted against a screen rect, updated in
/// place, and destroyed on every exit path.
pub trait PopupHost {
    fn mount(&mut self, rect: ScreenRect);
    fn set_position(&mut self, rect: ScreenRect);
    fn hide(&mut self);
    fn destroy(&mut self);
}

/// Key events delegated to the palette while it is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteKey {
    Up,
    Down,
    Enter,
    Tab,
    Escape,
    Other,
}

/// Drives the popup lifecycle for one `/` activation: filtered item list,
/// highlighted row, and the tracked query span. Single-threaded and
/// cooperative; one `on_start`/`on_update`/`on_exit` sequence per
/// activation.
pub struct SuggestionController<H: PopupHost> {
    host: H,
    filtered: Vec<usize>,
    selected: usize,
    range: Option<InlineRange>,
    mounted: bool,
    outcome: Option<PaletteOutcome>,
}

impl<H: PopupHost> SuggestionController<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            filtered: Vec::new(),
            selected: 0,
            range: None,
            mounted: false,
            outcome: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.range.is_some()
    }

    /// Currently visible items, catalog order.
    pub fn filtered_items(&self) -> Vec<&'static CommandItem> {
        self.filtered.iter().map(|&i| &COMMANDS[i]).collect()
    }

    pub fn selected_item(&self) -> Option<&'static CommandItem> {
        self.filtered.get(self.selected).map(|&i| &COMMANDS[i])
    }

    /// Effect requested by the last committed action, if any.
    pub fn take_outcome(&mut self) -> Option<PaletteOutcome> {
        self.outcome.take()
    }

    /// Activation: filter for the initial query and mount the popup at the
    /// span's screen position. A missing rect skips mounting this cycle.
    pub fn on_start(&mut self, query: &str, range: InlineRange, rect: Option<ScreenRect>) {
        self.refilter(query);
        self.selected = 0;
        self.range = Some(range);
        if let Some(rect) = rect {
            self.host.mount(rect);
            self.mounted = true;
        }
        debug!(query, items = self.filtered.len(), "palette opened");
    }

    /// Query span changed: refilter and reposition in place.
    pub fn on_update(&mut self, query: &str, range: InlineRange, rect: Option<ScreenRect>) {
        self.refilter(query);
        if self.selected >= self.filtered.len() {
            self.selected = 0;
        }
        self.range = Some(range);
        if let Some(rect) = rect {
            if self.mounted {
                self.host.set_position(rect);
            } else {
                self.host.mount(rect);
                self.mounted = true;
            }
        }
    }

    /// Delegated key handling. Escape hides the popup and consumes the
    /// key; arrows move the highlight; Enter/Tab commit the highlighted
    /// item against the tracked range. Returns whether the key was
    /// consumed.
    pub fn on_key_down(&mut self, key: PaletteKey, editor: &mut Editor) -> bool {
        match key {
            PaletteKey::Escape => {
                self.host.hide();
                true
            }
            PaletteKey::Up => {
                if self.filtered.is_empty() {
                    return false;
                }
                self.selected = (self.selected + self.filtered.len() - 1) % self.filtered.len();
                true
            }
            PaletteKey::Down => {
                if self.filtered.is_empty() {
                    return false;
                }
                self.selected = (self.selected + 1) % self.filtered.len();
                true
            }
            PaletteKey::Enter | PaletteKey::Tab => {
                let (Some(range), Some(&index)) = (self.range, self.filtered.get(self.selected))
                else {
                    return false;
                };
                let item = &COMMANDS[index];
                debug!(title = item.title, "palette commit");
                self.outcome = Some(item.action.apply(editor, range));
                true
            }
            PaletteKey::Other => false,
        }
    }

    /// Query span abandoned: destroy the popup and release its resources.
    /// Safe on every exit path, including ones where mounting was skipped.
    pub fn on_exit(&mut self) {
        if self.mounted {
            self.host.destroy();
            self.mounted = false;
        }
        self.range = None;
        self.filtered.clear();
        self.selected = 0;
        debug!("palette closed");
    }

    /// Reconcile against the editor after an edit: opens, updates, or
    /// exits based on whether a `/query` span is live at the caret.
    pub fn sync(&mut self, editor: &Editor, rect: Option<ScreenRect>) {
        match (active_query_span(editor), self.is_active()) {
            (Some((range, query)), false) => self.on_start(&query, range, rect),
            (Some((range, query)), true) => self.on_update(&query, range, rect),
            (None, true) => self.on_exit(),
            (None, false) => {}
        }
    }

    fn refilter(&mut self, query: &str) {
        let query = query.to_lowercase();
        self.filtered = COMMANDS
            .iter()
            .enumerate()
            .filter(|(_, item)| command_matches(item, &query))
            .map(|(i, _)| i)
            .collect();
    }
}

/// The live `/query` span at the caret, if any: the marker must sit at the
/// start of text or after whitespace, and the query may not contain
/// whitespace. Returns the span (marker included) and the query text.
pub fn active_query_span(editor: &Editor) -> Option<(InlineRange, String)> {
    if !editor.selection.is_empty() {
        return None;
    }
    let head = editor.selection.head;
    let (run, run_start) = editor.current_block().text_run_ending_at(head);
    let marker_rel = run.rfind('/')?;
    let marker_char_idx = run[..marker_rel].chars().count();
    if marker_char_idx > 0 {
        let before = run.chars().nth(marker_char_idx - 1)?;
        if !before.is_whitespace() {
            return None;
        }
    } else if run_start != 0 {
        // Run begins mid-block (after a chip): not a start-of-text marker.
        return None;
    }
    let query: String = run[marker_rel + 1..].to_string();
    if query.chars().any(char::is_whitespace) {
        return None;
    }
    let from = run_start + marker_char_idx;
    Some((
        InlineRange {
            block: editor.selection.block,
            from,
            to: head,
        },
        query,
    ))
}
