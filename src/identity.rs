//! Client session identity, persisted across runs.
//!
//! The server keys a story by an opaque id the client generates. The id is
//! stored in a small file so a later run resumes the same story.

use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// Opaque id the server uses to find this client's story.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientSessionId(String);

impl ClientSessionId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing id. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        (!raw.is_empty()).then(|| Self(raw.to_string()))
    }

    /// The id as sent on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Load the id stored at `path`, creating and storing a new one if the
    /// file is missing or blank.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                if let Some(id) = Self::parse(&contents) {
                    return Ok(id);
                }
                tracing::warn!(path = %path.display(), "stored session id is blank, generating a new one");
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read session id from {}", path.display()));
            }
        }

        let id = Self::generate();
        id.store(path)?;
        tracing::info!(session_id = %id, "created client session id");
        Ok(id)
    }

    /// Replace the stored id with a fresh one.
    pub fn reset(path: &Path) -> Result<Self> {
        let id = Self::generate();
        id.store(path)?;
        Ok(id)
    }

    /// Write the id to `path`, creating parent directories.
    pub fn store(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, format!("{}\n", self.0))
            .with_context(|| format!("Failed to write session id to {}", path.display()))
    }
}

impl fmt::Display for ClientSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_once_then_reused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session_id");

        let first = ClientSessionId::load_or_create(&path).unwrap();
        let second = ClientSessionId::load_or_create(&path).unwrap();
        assert_eq!(first, second);
        assert!(Uuid::parse_str(first.as_str()).is_ok());
    }

    #[test]
    fn test_reset_changes_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session_id");
        let first = ClientSessionId::load_or_create(&path).unwrap();
        let reset = ClientSessionId::reset(&path).unwrap();
        assert_ne!(first, reset);
        assert_eq!(ClientSessionId::load_or_create(&path).unwrap(), reset);
    }

    #[test]
    fn test_blank_file_regenerates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session_id");
        fs::write(&path, "  \n").unwrap();
        let id = ClientSessionId::load_or_create(&path).unwrap();
        assert!(!id.as_str().is_empty());
    }

    #[test]
    fn test_parse_trims() {
        assert_eq!(
            ClientSessionId::parse(" abc \n").map(|id| id.as_str().to_string()),
            Some("abc".to_string())
        );
        assert!(ClientSessionId::parse("   ").is_none());
    }
}
