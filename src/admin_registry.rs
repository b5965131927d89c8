//! Registry of authorized identities.
//!
//! The file-backed registry re-reads its document on every call, so edits to
//! the admin file take effect without a restart.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::NoteResult;
use crate::models::AdminsDocument;

/// Source of the identities allowed through the auth gate.
pub trait AdminRegistry: Send + Sync {
    /// List every authorized identity.
    fn list_admins(&self) -> NoteResult<Vec<String>>;

    /// Check whether `identity` is listed.
    fn is_admin(&self, identity: &str) -> NoteResult<bool> {
        Ok(self.list_admins()?.iter().any(|a| a == identity))
    }
}

/// Admin registry read from a JSON file (`{"admins": [...]}`).
#[derive(Debug, Clone)]
pub struct JsonFileAdminRegistry {
    path: PathBuf,
}

impl JsonFileAdminRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AdminRegistry for JsonFileAdminRegistry {
    fn list_admins(&self) -> NoteResult<Vec<String>> {
        let raw = fs::read_to_string(&self.path)?;
        let doc: AdminsDocument = serde_json::from_str(&raw)?;
        Ok(doc.admins)
    }
}

/// Fixed admin list, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticAdminRegistry {
    admins: Vec<String>,
}

impl StaticAdminRegistry {
    pub fn new<I, S>(admins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            admins: admins.into_iter().map(Into::into).collect(),
        }
    }
}

impl AdminRegistry for StaticAdminRegistry {
    fn list_admins(&self) -> NoteResult<Vec<String>> {
        Ok(self.admins.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NoteError;
    use tempfile::TempDir;

    #[test]
    fn test_list_admins_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("admin.json");
        fs::write(&path, r#"{"admins": ["alice", "bob"]}"#).unwrap();

        let registry = JsonFileAdminRegistry::new(&path);
        assert_eq!(registry.list_admins().unwrap(), vec!["alice", "bob"]);
        assert!(registry.is_admin("alice").unwrap());
        assert!(!registry.is_admin("mallory").unwrap());
    }

    #[test]
    fn test_file_is_reread_on_every_call() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("admin.json");
        fs::write(&path, r#"{"admins": ["alice"]}"#).unwrap();

        let registry = JsonFileAdminRegistry::new(&path);
        assert!(!registry.is_admin("carol").unwrap());

        fs::write(&path, r#"{"admins": ["alice", "carol"]}"#).unwrap();
        assert!(registry.is_admin("carol").unwrap());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let registry = JsonFileAdminRegistry::new(temp_dir.path().join("absent.json"));

        assert!(matches!(registry.list_admins(), Err(NoteError::Io(_))));
    }

    #[test]
    fn test_malformed_file_is_json_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("admin.json");
        fs::write(&path, r#"{"admins": "alice"}"#).unwrap();

        let registry = JsonFileAdminRegistry::new(&path);
        assert!(matches!(registry.list_admins(), Err(NoteError::Json(_))));
    }

    #[test]
    fn test_static_registry() {
        let registry = StaticAdminRegistry::new(["u1", "u2"]);
        assert!(registry.is_admin("u2").unwrap());
        assert!(!registry.is_admin("u3").unwrap());
    }
}
