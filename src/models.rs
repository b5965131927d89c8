//! Data models for notekeeper.
//!
//! This module defines the persisted entities (Note and the two on-disk
//! documents) and the request bodies the HTTP layer accepts.

use serde::{Deserialize, Serialize};

use crate::error::{NoteError, NoteResult};

/// Represents a note in the system.
///
/// A note has no identity beyond its membership in the persisted
/// collection; `user` is the identity that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Positive identifier, unique within the collection
    pub id: u64,
    pub title: String,
    pub content: String,
    /// Owner identity (matched against the authorization header on listing)
    pub user: String,
}

impl Note {
    /// Create a new note with the given fields
    pub fn new(
        id: u64,
        title: impl Into<String>,
        content: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            user: user.into(),
        }
    }

    /// Check if this note belongs to the given identity
    pub fn is_owned_by(&self, user: &str) -> bool {
        self.user == user
    }
}

/// The full contents of the notes file.
///
/// `next_id` is absent in files written by older versions; it is then
/// derived from the highest id present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesDocument {
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<u64>,
}

impl NotesDocument {
    /// Hand out the next id and advance the counter.
    ///
    /// Ids are never reused, even after the note holding the highest id is
    /// deleted, because the counter is persisted with the collection.
    /// Fails once the id space is used up; the document is left unchanged.
    pub fn allocate_id(&mut self) -> NoteResult<u64> {
        let highest = self.notes.iter().map(|n| n.id).max().unwrap_or(0);
        let above_existing = highest.checked_add(1).ok_or(NoteError::IdsExhausted)?;
        let id = self.next_id.unwrap_or(above_existing).max(above_existing);
        self.next_id = Some(id.checked_add(1).ok_or(NoteError::IdsExhausted)?);
        Ok(id)
    }

    /// Remove every note with the given id
    pub fn remove(&mut self, id: u64) {
        self.notes.retain(|n| n.id != id);
    }
}

/// The contents of the admin file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminsDocument {
    #[serde(default)]
    pub admins: Vec<String>,
}

/// Request body for creating or fully replacing a note.
///
/// Absent fields become empty strings; the service does not validate them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub user: String,
}

/// Request body for a partial update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub user: Option<String>,
}

impl NotePatch {
    /// Merge the patch onto an existing note, keeping fields the patch omits
    pub fn apply_to(self, existing: &Note) -> Note {
        Note {
            id: existing.id,
            title: self.title.unwrap_or_else(|| existing.title.clone()),
            content: self.content.unwrap_or_else(|| existing.content.clone()),
            user: self.user.unwrap_or_else(|| existing.user.clone()),
        }
    }
}
