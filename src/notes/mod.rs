//! Notes service: model, SQLite-backed store, and the ensure-note
//! lifecycle with in-flight request de-duplication.
//!
//! The store persists `labels: Vec<String>`, `pinned: bool`, `title`, and
//! `content` per note; the search pipeline ([`crate::search`]) operates on
//! snapshots of those fields only and never mutates the store directly.

mod lifecycle;
mod model;
mod storage;

pub use lifecycle::{EnsureOptions, EnsureOutcome, NoteLifecycle};
pub use model::{Note, NoteId};
pub use storage::NoteStore;
