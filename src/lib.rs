//! Core library for notekit, a keyboard-first note editor.
//!
//! The crate is split into a pure editing core and a fallible storage edge:
//!
//! - [`labels`] - label normalization and per-note label caps
//! - [`search`] - search query parsing and note matching
//! - [`document`] - flat-offset block/inline document model with tag chips
//! - [`editor`] - editing commands, the hash-tag input rule, and the
//!   slash-command palette
//! - [`notes`] - note model, SQLite persistence, and the ensure-note
//!   lifecycle with in-flight de-duplication
//! - [`config`] / [`logging`] / [`error`] - ambient application plumbing

pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod labels;
pub mod logging;
pub mod notes;
pub mod search;
