//! Note data model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::labels::normalize_labels;
use crate::search::SearchableNote;

/// Stable note identifier (UUID v4 under the hood).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(|u| Self(u.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self(Uuid::nil().to_string())
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Owning user id; the ensure-note lifecycle is keyed by this.
    pub owner: String,
    pub title: String,
    pub content: String,
    /// Canonical labels only; set through [`Note::set_labels`].
    pub labels: Vec<String>,
    pub pinned: bool,
    pub folder: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft delete marker; set notes land in the trash.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Note {
    /// A fresh empty note for `owner`, titled "Untitled".
    pub fn new(owner: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: NoteId::new(),
            owner: owner.into(),
            title: "Untitled".to_string(),
            content: String::new(),
            labels: Vec::new(),
            pinned: false,
            folder: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Replace the label set from raw user input. Rejects are dropped,
    /// duplicates merged, capped - only canonical labels are ever stored.
    pub fn set_labels<S: AsRef<str>>(&mut self, raw: &[S]) {
        self.labels = normalize_labels(raw);
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Snapshot of the searchable fields for the note matcher.
    pub fn searchable(&self) -> SearchableNote<'_> {
        SearchableNote {
            title: Some(&self.title),
            content: Some(&self.content),
            labels: &self.labels,
            pinned: self.pinned,
        }
    }
}
