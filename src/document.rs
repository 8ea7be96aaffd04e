//! Minimal block/inline rich-text document model.
//!
//! A [`Doc`] is a list of blocks; a block carries a kind (paragraph,
//! heading, list, ...) and a run of inline content. Inline content is
//! either plain text or a [`TagChip`] - an editable colored span holding a
//! short label body.
//!
//! Offsets are flat per block: a text character occupies one unit and a
//! chip occupies `inner_len + 2` units, the extra two being its open/close
//! boundary tokens. A caret at `chip_start + 1 + k` sits inside the chip
//! before inner character `k`. [`Block::char_at`] returns `None` for the
//! boundary tokens, so "the character before the selection" is absent when
//! the selection abuts a chip edge.

use serde::{Deserialize, Serialize};

/// Color attribute of a tag chip. Unrecognized or legacy colors (blue,
/// purple) collapse onto `Accent` at the alias-resolution layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChipColor {
    #[default]
    Accent,
    Green,
    Yellow,
    Red,
}

/// Inline editable tag chip: a color attribute plus a short plain-text
/// body. The body is not label-normalized at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagChip {
    pub color: ChipColor,
    pub text: String,
}

impl TagChip {
    pub fn new(color: ChipColor, text: impl Into<String>) -> Self {
        Self {
            color,
            text: text.into(),
        }
    }

    /// Offset units the chip occupies: inner chars plus two boundary tokens.
    pub fn size(&self) -> usize {
        self.text.chars().count() + 2
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Inline {
    Text(String),
    Chip(TagChip),
}

impl Inline {
    pub fn size(&self) -> usize {
        match self {
            Inline::Text(t) => t.chars().count(),
            Inline::Chip(c) => c.size(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    #[default]
    Paragraph,
    Heading(u8),
    BulletList,
    NumberedList,
    TaskList,
    Blockquote,
    CodeBlock,
    Divider,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    pub content: Vec<Inline>,
}

/// A chip located by [`Block::chip_containing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipRef {
    /// Index into the block's inline content.
    pub index: usize,
    /// Block offset of the chip's open boundary token.
    pub start: usize,
    /// Caret position inside the chip body, `0..=inner_len`.
    pub inner_offset: usize,
    /// Chip body length in chars.
    pub inner_len: usize,
}

impl Block {
    pub fn paragraph() -> Self {
        Self {
            kind: BlockKind::Paragraph,
            content: Vec::new(),
        }
    }

    pub fn with_text(kind: BlockKind, text: impl Into<String>) -> Self {
        let text = text.into();
        let content = if text.is_empty() {
            Vec::new()
        } else {
            vec![Inline::Text(text)]
        };
        Self { kind, content }
    }

    /// Total offset length of the block.
    pub fn size(&self) -> usize {
        self.content.iter().map(Inline::size).sum()
    }

    /// The character occupying `[offset, offset + 1)`, if that span is a
    /// real character. Chip boundary tokens yield `None`.
    pub fn char_at(&self, offset: usize) -> Option<char> {
        let mut pos = 0;
        for inline in &self.content {
            let size = inline.size();
            if offset < pos + size {
                return match inline {
                    Inline::Text(t) => t.chars().nth(offset - pos),
                    Inline::Chip(c) => {
                        let rel = offset - pos;
                        if rel == 0 || rel == size - 1 {
                            None
                        } else {
                            c.text.chars().nth(rel - 1)
                        }
                    }
                };
            }
            pos += size;
        }
        None
    }

    /// The chip whose interior strictly contains the caret `offset`.
    pub fn chip_containing(&self, offset: usize) -> Option<ChipRef> {
        let mut pos = 0;
        for (index, inline) in self.content.iter().enumerate() {
            let size = inline.size();
            if let Inline::Chip(c) = inline {
                if offset > pos && offset < pos + size {
                    return Some(ChipRef {
                        index,
                        start: pos,
                        inner_offset: offset - pos - 1,
                        inner_len: c.text.chars().count(),
                    });
                }
            }
            pos += size;
        }
        None
    }

    /// Insert plain text at `offset`. Text landing strictly inside a chip
    /// splices into the chip's body; text at a chip boundary lands outside.
    pub fn insert_text(&mut self, offset: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        enum Target {
            TextRun(usize, usize),
            ChipBody(usize, usize),
            BeforeChip(usize),
            Append,
        }
        let mut target = Target::Append;
        let mut pos = 0;
        for (index, inline) in self.content.iter().enumerate() {
            let size = inline.size();
            match inline {
                Inline::Text(_) => {
                    if offset <= pos + size {
                        target = Target::TextRun(index, offset - pos);
                        break;
                    }
                }
                Inline::Chip(_) => {
                    if offset == pos {
                        target = Target::BeforeChip(index);
                        break;
                    }
                    if offset <= pos + size - 1 {
                        target = Target::ChipBody(index, offset - pos - 1);
                        break;
                    }
                }
            }
            pos += size;
        }
        match target {
            Target::TextRun(index, at) => {
                if let Inline::Text(t) = &mut self.content[index] {
                    splice_chars(t, at, text);
                }
            }
            Target::ChipBody(index, at) => {
                if let Inline::Chip(c) = &mut self.content[index] {
                    splice_chars(&mut c.text, at, text);
                }
            }
            Target::BeforeChip(index) => {
                self.content.insert(index, Inline::Text(text.to_string()));
            }
            Target::Append => self.content.push(Inline::Text(text.to_string())),
        }
        self.normalize();
    }

    /// Insert an inline node at `offset`, splitting a text run if needed.
    /// Must not be called with an offset inside a chip.
    pub fn insert_inline(&mut self, offset: usize, node: Inline) {
        let mut pos = 0;
        let mut at = self.content.len();
        let mut split: Option<(usize, usize)> = None;
        for (index, inline) in self.content.iter().enumerate() {
            let size = inline.size();
            if offset <= pos {
                at = index;
                break;
            }
            if offset < pos + size {
                if matches!(inline, Inline::Text(_)) {
                    split = Some((index, offset - pos));
                } else {
                    // Inside a chip: refuse the split, drop at the chip edge.
                    at = index;
                }
                break;
            }
            pos += size;
        }
        if let Some((index, cut)) = split {
            let (head, tail) = match &self.content[index] {
                Inline::Text(t) => (
                    t.chars().take(cut).collect::<String>(),
                    t.chars().skip(cut).collect::<String>(),
                ),
                Inline::Chip(_) => unreachable!("split target is a text run"),
            };
            self.content[index] = Inline::Text(head);
            self.content.insert(index + 1, node);
            if !tail.is_empty() {
                self.content.insert(index + 2, Inline::Text(tail));
            }
        } else {
            self.content.insert(at, node);
        }
        self.normalize();
    }

    /// Delete the offset range `[from, to)`. Total over any input: a chip
    /// is removed only when the range covers it entirely, otherwise only
    /// the overlapped part of its body is trimmed.
    pub fn delete(&mut self, from: usize, to: usize) {
        if to <= from {
            return;
        }
        let old = std::mem::take(&mut self.content);
        let mut pos = 0;
        for inline in old {
            let size = inline.size();
            let (start, end) = (pos, pos + size);
            pos = end;
            if to <= start || from >= end {
                self.content.push(inline);
                continue;
            }
            match inline {
                Inline::Text(t) => {
                    let keep_head = from.saturating_sub(start).min(size);
                    let resume = (to - start).min(size);
                    let kept: String = t
                        .chars()
                        .take(keep_head)
                        .chain(t.chars().skip(resume))
                        .collect();
                    if !kept.is_empty() {
                        self.content.push(Inline::Text(kept));
                    }
                }
                Inline::Chip(mut c) => {
                    if from <= start && to >= end {
                        continue; // fully covered: drop the chip
                    }
                    let inner_len = c.text.chars().count();
                    let trim_from = from.max(start + 1) - (start + 1);
                    let trim_to = (to.min(start + 1 + inner_len)).saturating_sub(start + 1);
                    if trim_to > trim_from {
                        let kept: String = c
                            .text
                            .chars()
                            .take(trim_from)
                            .chain(c.text.chars().skip(trim_to))
                            .collect();
                        c.text = kept;
                    }
                    self.content.push(Inline::Chip(c));
                }
            }
        }
        self.normalize();
    }

    /// Remove an inline node by index. Used by the empty-chip cleanup pass.
    pub fn remove_inline(&mut self, index: usize) {
        if index < self.content.len() {
            self.content.remove(index);
            self.normalize();
        }
    }

    /// Block offset where the inline at `index` starts.
    pub fn inline_start(&self, index: usize) -> usize {
        self.content.iter().take(index).map(Inline::size).sum()
    }

    /// Contiguous plain text ending at `offset`, together with the block
    /// offset where that run starts. Empty when `offset` sits inside a chip
    /// or directly after one.
    pub fn text_run_ending_at(&self, offset: usize) -> (String, usize) {
        let mut pos = 0;
        for inline in &self.content {
            let size = inline.size();
            if let Inline::Text(t) = inline {
                if offset >= pos && offset <= pos + size {
                    let prefix: String = t.chars().take(offset - pos).collect();
                    return (prefix, pos);
                }
            }
            pos += size;
        }
        (String::new(), offset)
    }

    /// Merge adjacent text runs and drop empty ones. Empty chips are left
    /// alone here; the editor's cleanup pass owns that invariant.
    fn normalize(&mut self) {
        let old = std::mem::take(&mut self.content);
        for inline in old {
            match inline {
                Inline::Text(t) if t.is_empty() => {}
                Inline::Text(t) => {
                    if let Some(Inline::Text(prev)) = self.content.last_mut() {
                        prev.push_str(&t);
                    } else {
                        self.content.push(Inline::Text(t));
                    }
                }
                chip => self.content.push(chip),
            }
        }
    }

    /// Plain-text rendering; chips contribute `#body`.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        for inline in &self.content {
            match inline {
                Inline::Text(t) => out.push_str(t),
                Inline::Chip(c) => {
                    out.push('#');
                    out.push_str(&c.text);
                }
            }
        }
        out
    }
}

/// Insert `text` at char index `at` of `target`.
fn splice_chars(target: &mut String, at: usize, text: &str) {
    let byte_at = target
        .char_indices()
        .nth(at)
        .map(|(b, _)| b)
        .unwrap_or(target.len());
    target.insert_str(byte_at, text);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doc {
    pub blocks: Vec<Block>,
}

impl Default for Doc {
    fn default() -> Self {
        Self::new()
    }
}

impl Doc {
    /// An empty document: one empty paragraph.
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::paragraph()],
        }
    }

    pub fn from_plain_text(text: &str) -> Self {
        let blocks: Vec<Block> = text
            .split('\n')
            .map(|line| Block::with_text(BlockKind::Paragraph, line))
            .collect();
        Self { blocks }
    }

    pub fn to_plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::to_plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// All chips in document order as `(block_index, inline_index)`.
    pub fn chip_positions(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for (b, block) in self.blocks.iter().enumerate() {
            for (i, inline) in block.content.iter().enumerate() {
                if matches!(inline, Inline::Chip(_)) {
                    out.push((b, i));
                }
            }
        }
        out
    }
}
