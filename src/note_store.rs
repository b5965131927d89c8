//! Note persistence.
//!
//! The [`NoteStore`] trait is the only way the HTTP layer touches notes, so
//! the backing store can be swapped:
//!
//! - [`JsonFileNoteStore`] keeps the whole collection in one JSON document
//!   and rewrites it on every mutation
//! - [`MemoryNoteStore`] keeps the same document in memory, for tests
//!
//! Stores do no locking of their own. Callers share one store behind a
//! mutex and hold it for a whole check-then-mutate sequence.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::NoteResult;
use crate::models::{Note, NotesDocument};

/// Storage for the note collection.
pub trait NoteStore: Send {
    /// Read every stored note.
    fn get_all(&self) -> NoteResult<Vec<Note>>;

    /// Find the first note with the given id.
    fn get_by_id(&self, id: u64) -> NoteResult<Option<Note>> {
        Ok(self.get_all()?.into_iter().find(|n| n.id == id))
    }

    /// Store a new note under a freshly allocated id and return it.
    fn add(&mut self, title: &str, content: &str, user: &str) -> NoteResult<Note>;

    /// Replace the note with `id` by a note with the given fields.
    ///
    /// The replacement is appended to the end of the collection. If no note
    /// with `id` exists this inserts one.
    fn replace(&mut self, id: u64, title: &str, content: &str, user: &str) -> NoteResult<()>;

    /// Remove the note with `id`. Removing an absent id is not an error.
    fn delete_by_id(&mut self, id: u64) -> NoteResult<()>;
}

fn add_to(doc: &mut NotesDocument, title: &str, content: &str, user: &str) -> NoteResult<Note> {
    let note = Note::new(doc.allocate_id()?, title, content, user);
    doc.notes.push(note.clone());
    Ok(note)
}

fn replace_in(doc: &mut NotesDocument, id: u64, title: &str, content: &str, user: &str) {
    doc.remove(id);
    doc.notes.push(Note::new(id, title, content, user));
    // a replace that degraded to insert must not let the counter fall behind
    if let Some(after) = id.checked_add(1) {
        if doc.next_id.is_some_and(|next| next <= id) {
            doc.next_id = Some(after);
        }
    }
}

/// Note store backed by a single JSON file.
///
/// Each mutation reads the full document, changes it, and writes it back
/// through a temp file that is renamed over the existing file.
#[derive(Debug)]
pub struct JsonFileNoteStore {
    path: PathBuf,
}

impl JsonFileNoteStore {
    /// Open the store at `path`, creating an empty document if none exists.
    pub fn open(path: impl Into<PathBuf>) -> NoteResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let store = Self { path };
        if !store.path.exists() {
            tracing::info!("Creating empty notes file at {}", store.path.display());
            store.write_document(&NotesDocument::default())?;
        }
        Ok(store)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> NoteResult<NotesDocument> {
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_document(&self, doc: &NotesDocument) -> NoteResult<()> {
        let content = serde_json::to_string_pretty(doc)?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let mut file = File::create(&tmp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &self.path)?;
        tracing::trace!("Wrote {} notes to {}", doc.notes.len(), self.path.display());
        Ok(())
    }
}

impl NoteStore for JsonFileNoteStore {
    fn get_all(&self) -> NoteResult<Vec<Note>> {
        Ok(self.read_document()?.notes)
    }

    fn add(&mut self, title: &str, content: &str, user: &str) -> NoteResult<Note> {
        let mut doc = self.read_document()?;
        let note = add_to(&mut doc, title, content, user)?;
        self.write_document(&doc)?;
        Ok(note)
    }

    fn replace(&mut self, id: u64, title: &str, content: &str, user: &str) -> NoteResult<()> {
        let mut doc = self.read_document()?;
        replace_in(&mut doc, id, title, content, user);
        self.write_document(&doc)
    }

    fn delete_by_id(&mut self, id: u64) -> NoteResult<()> {
        let mut doc = self.read_document()?;
        doc.remove(id);
        self.write_document(&doc)
    }
}

/// In-memory note store with the same semantics as the file store.
#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    doc: NotesDocument,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing document
    pub fn with_document(doc: NotesDocument) -> Self {
        Self { doc }
    }
}

impl NoteStore for MemoryNoteStore {
    fn get_all(&self) -> NoteResult<Vec<Note>> {
        Ok(self.doc.notes.clone())
    }

    fn add(&mut self, title: &str, content: &str, user: &str) -> NoteResult<Note> {
        add_to(&mut self.doc, title, content, user)
    }

    fn replace(&mut self, id: u64, title: &str, content: &str, user: &str) -> NoteResult<()> {
        replace_in(&mut self.doc, id, title, content, user);
        Ok(())
    }

    fn delete_by_id(&mut self, id: u64) -> NoteResult<()> {
        self.doc.remove(id);
        Ok(())
    }
}
