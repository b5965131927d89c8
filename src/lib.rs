//! notekeeper - a minimal note-taking REST service.
//!
//! This library provides:
//! - Data models (Note and the on-disk documents)
//! - Note storage behind the `NoteStore` trait (JSON file or in memory)
//! - The admin registry (static allow-list read from disk)
//! - Configuration management
//! - The HTTP server: auth gate and note routes
//!
//! # Feature Flags
//!
//! - `server` (default): Include HTTP server components (axum, tower) and the binary.

pub mod admin_registry;
#[cfg(feature = "server")]
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
#[cfg(feature = "server")]
pub mod note_server;
pub mod note_store;
pub mod validation;

/// Number of identity characters shown in log lines
pub const IDENTITY_SHORT_LEN: usize = 8;

// Re-export commonly used types
pub use admin_registry::{AdminRegistry, JsonFileAdminRegistry, StaticAdminRegistry};
pub use config::{AuthMode, Config};
pub use error::{NoteError, NoteResult};
pub use models::{Note, NoteInput, NotePatch, NotesDocument};
pub use note_store::{JsonFileNoteStore, MemoryNoteStore, NoteStore};

#[cfg(feature = "server")]
pub use note_server::{create_router, start_server, stop_server, AppState};
