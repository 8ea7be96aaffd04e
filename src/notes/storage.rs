//! SQLite-backed persistence for notes.
//!
//! The store owns its connection behind a non-poisoning mutex and is
//! passed around as a value dependency rather than living in a global.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::search::{matches_note_search, parse_search_filters};

use super::model::{Note, NoteId};

pub struct NoteStore {
    conn: Mutex<Connection>,
}

/// Default database location (~/.notekit/db/notes.sqlite).
pub fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".notekit"))
        .unwrap_or_else(|| PathBuf::from(".notekit"))
        .join("db")
        .join("notes.sqlite")
}

impl NoteStore {
    /// Open (creating if needed) the notes database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create notes db directory")?;
        }

        let conn = Connection::open(path).context("Failed to open notes database")?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to enable WAL mode")?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS notes (
                id TEXT PRIMARY KEY,
                owner TEXT NOT NULL,
                title TEXT NOT NULL DEFAULT '',
                content TEXT NOT NULL DEFAULT '',
                labels TEXT NOT NULL DEFAULT '[]',
                pinned INTEGER NOT NULL DEFAULT 0,
                folder TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_notes_owner ON notes(owner);
            CREATE INDEX IF NOT EXISTS idx_notes_updated_at ON notes(updated_at DESC);
            CREATE INDEX IF NOT EXISTS idx_notes_deleted_at ON notes(deleted_at);
            "#,
        )
        .context("Failed to create notes tables")?;

        info!(db_path = %path.display(), "Notes database opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(&default_db_path())
    }

    /// Insert or update a note.
    pub fn save(&self, note: &Note) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            r#"
            INSERT INTO notes (id, owner, title, content, labels, pinned, folder,
                               created_at, updated_at, deleted_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                owner = excluded.owner,
                title = excluded.title,
                content = excluded.content,
                labels = excluded.labels,
                pinned = excluded.pinned,
                folder = excluded.folder,
                updated_at = excluded.updated_at,
                deleted_at = excluded.deleted_at
            "#,
            params![
                note.id.as_str(),
                note.owner,
                note.title,
                note.content,
                serde_json::to_string(&note.labels)?,
                note.pinned as i32,
                note.folder,
                note.created_at.to_rfc3339(),
                note.updated_at.to_rfc3339(),
                note.deleted_at.map(|dt| dt.to_rfc3339()),
            ],
        )
        .context("Failed to save note")?;

        debug!(note_id = %note.id, title = %note.title, "Note saved");
        Ok(())
    }

    pub fn get(&self, id: &NoteId) -> Result<Option<Note>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
            .context("Failed to prepare get query")?;
        let note = stmt
            .query_row(params![id.as_str()], row_to_note)
            .optional()
            .context("Failed to get note")?;
        Ok(note)
    }

    /// Active notes for `owner`, pinned first, most recently updated first.
    pub fn list(&self, owner: &str) -> Result<Vec<Note>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(&format!(
                "{SELECT_COLUMNS} WHERE owner = ?1 AND deleted_at IS NULL \
                 ORDER BY pinned DESC, updated_at DESC"
            ))
            .context("Failed to prepare list query")?;
        let notes = stmt
            .query_map(params![owner], row_to_note)
            .context("Failed to query notes")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to collect notes")?;
        debug!(owner, count = notes.len(), "Listed notes");
        Ok(notes)
    }

    /// Soft-deleted notes for `owner`, most recently deleted first.
    pub fn list_trash(&self, owner: &str) -> Result<Vec<Note>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(&format!(
                "{SELECT_COLUMNS} WHERE owner = ?1 AND deleted_at IS NOT NULL \
                 ORDER BY deleted_at DESC"
            ))
            .context("Failed to prepare trash query")?;
        let notes = stmt
            .query_map(params![owner], row_to_note)
            .context("Failed to query trash")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to collect trash")?;
        Ok(notes)
    }

    /// Id of the most recently updated active note, optionally skipping one.
    pub fn latest_note_id(&self, owner: &str, exclude: Option<&NoteId>) -> Result<Option<NoteId>> {
        let conn = self.conn.lock();
        let excluded = exclude.map(NoteId::as_str).unwrap_or_default();
        let id: Option<String> = conn
            .query_row(
                "SELECT id FROM notes \
                 WHERE owner = ?1 AND deleted_at IS NULL AND id != ?2 \
                 ORDER BY updated_at DESC LIMIT 1",
                params![owner, excluded],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to query latest note")?;
        Ok(id.as_deref().and_then(NoteId::parse))
    }

    /// Filtered search over an owner's active notes using the query
    /// grammar of [`crate::search`]. Runs on row snapshots; plain
    /// substring semantics, no ranking.
    pub fn search(&self, owner: &str, query: &str) -> Result<Vec<Note>> {
        let filters = parse_search_filters(query);
        let notes = self.list(owner)?;
        let matched: Vec<Note> = notes
            .into_iter()
            .filter(|n| matches_note_search(&n.searchable(), &filters))
            .collect();
        debug!(owner, query, count = matched.len(), "Note search completed");
        Ok(matched)
    }

    /// Move a note to the trash.
    pub fn soft_delete(&self, id: &NoteId) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE notes SET deleted_at = ?2 WHERE id = ?1",
            params![id.as_str(), Utc::now().to_rfc3339()],
        )
        .context("Failed to soft-delete note")?;
        info!(note_id = %id, "Note moved to trash");
        Ok(())
    }

    /// Restore a note from the trash.
    pub fn restore(&self, id: &NoteId) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE notes SET deleted_at = NULL WHERE id = ?1",
            params![id.as_str()],
        )
        .context("Failed to restore note")?;
        Ok(())
    }

    pub fn delete_permanently(&self, id: &NoteId) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM notes WHERE id = ?1", params![id.as_str()])
            .context("Failed to delete note")?;
        info!(note_id = %id, "Note permanently deleted");
        Ok(())
    }

    /// Remove notes soft-deleted more than `days` ago.
    pub fn prune_deleted(&self, days: u32) -> Result<usize> {
        let conn = self.conn.lock();
        let cutoff = Utc::now() - Duration::days(days as i64);
        let count = conn
            .execute(
                "DELETE FROM notes WHERE deleted_at IS NOT NULL AND deleted_at < ?1",
                params![cutoff.to_rfc3339()],
            )
            .context("Failed to prune trashed notes")?;
        if count > 0 {
            info!(count, days, "Pruned old trashed notes");
        }
        Ok(count)
    }
}

const SELECT_COLUMNS: &str = "SELECT id, owner, title, content, labels, pinned, folder, \
                              created_at, updated_at, deleted_at FROM notes";

fn row_to_note(row: &rusqlite::Row) -> rusqlite::Result<Note> {
    let id_str: String = row.get(0)?;
    let labels_json: String = row.get(4)?;
    let pinned: i32 = row.get(5)?;
    let created_at_str: String = row.get(7)?;
    let updated_at_str: String = row.get(8)?;
    let deleted_at_str: Option<String> = row.get(9)?;

    let parse_ts = |s: &str| {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    };

    Ok(Note {
        id: NoteId::parse(&id_str).unwrap_or_default(),
        owner: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        labels: serde_json::from_str(&labels_json).unwrap_or_default(),
        pinned: pinned != 0,
        folder: row.get(6)?,
        created_at: parse_ts(&created_at_str),
        updated_at: parse_ts(&updated_at_str),
        deleted_at: deleted_at_str.as_deref().map(parse_ts),
    })
}
