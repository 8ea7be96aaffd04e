//! Editor core: selection state, typing, block commands, and the two
//! custom extensions - the inline tag-chip engine ([`chips`]) and the
//! slash-command palette ([`palette`]).
//!
//! Every mutating command ends with the empty-chip cleanup pass, so the
//! "no empty chips persist" invariant holds after any edit, not just the
//! one that emptied a chip.

pub mod chips;
pub mod palette;

#[cfg(test)]
mod chips_tests;

use tracing::debug;

use crate::config::Config;
use crate::document::{Block, BlockKind, ChipColor, Doc};

/// Selection within a single block. `anchor == head` is a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub block: usize,
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn caret(block: usize, offset: usize) -> Self {
        Self {
            block,
            anchor: offset,
            head: offset,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    pub fn from_offset(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn to_offset(&self) -> usize {
        self.anchor.max(self.head)
    }
}

/// An offset range within one block, e.g. a palette query span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineRange {
    pub block: usize,
    pub from: usize,
    pub to: usize,
}

/// Direction for chip boundary navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

pub struct Editor {
    pub doc: Doc,
    pub selection: Selection,
    /// Color for chips inserted without an explicit color.
    pub default_chip_color: ChipColor,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self {
            doc: Doc::new(),
            selection: Selection::caret(0, 0),
            default_chip_color: ChipColor::Accent,
        }
    }

    /// Editor honoring the configured defaults.
    pub fn with_config(config: &Config) -> Self {
        Self {
            default_chip_color: config.default_chip_color,
            ..Self::new()
        }
    }

    pub fn from_plain_text(text: &str) -> Self {
        let doc = Doc::from_plain_text(text);
        let last = doc.blocks.len().saturating_sub(1);
        let end = doc.blocks[last].size();
        Self {
            doc,
            selection: Selection::caret(last, end),
            default_chip_color: ChipColor::Accent,
        }
    }

    pub fn current_block(&self) -> &Block {
        &self.doc.blocks[self.selection.block]
    }

    pub fn current_block_mut(&mut self) -> &mut Block {
        &mut self.doc.blocks[self.selection.block]
    }

    pub fn set_caret(&mut self, block: usize, offset: usize) {
        let block = block.min(self.doc.blocks.len().saturating_sub(1));
        let offset = offset.min(self.doc.blocks[block].size());
        self.selection = Selection::caret(block, offset);
    }

    pub fn set_selection(&mut self, block: usize, anchor: usize, head: usize) {
        let block = block.min(self.doc.blocks.len().saturating_sub(1));
        let size = self.doc.blocks[block].size();
        self.selection = Selection {
            block,
            anchor: anchor.min(size),
            head: head.min(size),
        };
    }

    /// Type text at the current selection. A non-empty selection is
    /// replaced first. When the text ends in whitespace the `#word`
    /// recognition rule is evaluated against the text behind the caret.
    pub fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if !self.selection.is_empty() {
            let (from, to) = (self.selection.from_offset(), self.selection.to_offset());
            self.current_block_mut().delete(from, to);
            self.selection = Selection::caret(self.selection.block, from);
        }
        let head = self.selection.head;
        self.current_block_mut().insert_text(head, text);
        let after = head + text.chars().count();
        self.selection = Selection::caret(self.selection.block, after);

        if text.chars().last().is_some_and(char::is_whitespace) {
            chips::apply_hash_tag_rule(self);
        }
        self.run_cleanup();
    }

    /// Delete an arbitrary range, e.g. a palette query span.
    pub fn delete_range(&mut self, range: InlineRange) {
        if range.block >= self.doc.blocks.len() {
            return;
        }
        let block = &mut self.doc.blocks[range.block];
        // A range partially covering a chip removes fewer units than it
        // spans (the chip's boundary tokens survive), so the caret shift
        // comes from the measured size delta, not the span.
        let before = block.size();
        block.delete(range.from, range.to);
        let removed = before - block.size();
        if self.selection.block == range.block {
            let adjust = |offset: usize| {
                if offset >= range.to {
                    offset - removed
                } else {
                    offset.min(range.from)
                }
            };
            self.selection.anchor = adjust(self.selection.anchor);
            self.selection.head = adjust(self.selection.head);
        }
        self.run_cleanup();
    }

    /// Set the current block's kind outright.
    pub fn set_block_kind(&mut self, kind: BlockKind) {
        self.current_block_mut().kind = kind;
        self.run_cleanup();
    }

    /// Toggle the current block between `kind` and a plain paragraph.
    pub fn toggle_block_kind(&mut self, kind: BlockKind) {
        let block = self.current_block_mut();
        block.kind = if block.kind == kind {
            BlockKind::Paragraph
        } else {
            kind
        };
        self.run_cleanup();
    }

    /// Insert a divider block after the current one, followed by a fresh
    /// paragraph that receives the caret.
    pub fn insert_divider(&mut self) {
        let at = self.selection.block + 1;
        self.doc.blocks.insert(
            at,
            Block {
                kind: BlockKind::Divider,
                content: Vec::new(),
            },
        );
        self.doc.blocks.insert(at + 1, Block::paragraph());
        self.selection = Selection::caret(at + 1, 0);
        self.run_cleanup();
    }

    /// Invariant-maintenance pass: delete chips whose trimmed body is
    /// empty, back-to-front so earlier deletions keep later coordinates
    /// valid. Runs after every mutating command.
    pub(crate) fn run_cleanup(&mut self) {
        let doomed = chips::empty_chip_positions(&self.doc);
        if doomed.is_empty() {
            return;
        }
        debug!(count = doomed.len(), "removing empty tag chips");
        for &(block_idx, inline_idx) in doomed.iter().rev() {
            let block = &mut self.doc.blocks[block_idx];
            let start = block.inline_start(inline_idx);
            let span = block.content[inline_idx].size();
            block.remove_inline(inline_idx);
            if self.selection.block == block_idx {
                let adjust = |offset: usize| {
                    if offset >= start + span {
                        offset - span
                    } else {
                        offset.min(start)
                    }
                };
                self.selection.anchor = adjust(self.selection.anchor);
                self.selection.head = adjust(self.selection.head);
            }
        }
        let size = self.current_block().size();
        self.selection.anchor = self.selection.anchor.min(size);
        self.selection.head = self.selection.head.min(size);
    }
}
