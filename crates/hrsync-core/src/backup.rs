//! Backup store
//!
//! Owns the persisted JSON file: a flat array of [`CanonicalRecord`]s.
//! In memory the backup is a [`BackupState`] indexed by identity key.

use crate::error::BackupError;
use crate::record::CanonicalRecord;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Identity key to canonical record
///
/// Ordered by key so the persisted array is stable from run to run.
pub type BackupState = BTreeMap<String, CanonicalRecord>;

/// Indentation of the persisted file
const INDENT: &[u8] = b"    ";

/// Reads and atomically rewrites the backup file
#[derive(Debug, Clone)]
pub struct BackupStore {
    path: PathBuf,
}

impl BackupStore {
    /// Create store for the file at `path`
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backup file path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the previous state
    ///
    /// A missing file is an empty state. Entries without an identity key are
    /// dropped.
    ///
    /// # Errors
    /// - `BackupError::Parse` if the file is not a JSON array
    /// - `BackupError::Io` if the file exists but cannot be read
    pub fn load(&self) -> Result<BackupState, BackupError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no previous backup");
                return Ok(BackupState::new());
            }
            Err(e) => return Err(BackupError::io_error(&self.path, e)),
        };

        let entries: Vec<Value> = serde_json::from_slice(&bytes)
            .map_err(|e| BackupError::parse_error(&self.path, e))?;

        let mut state = BackupState::new();
        let mut dropped = 0usize;
        for entry in entries {
            match serde_json::from_value::<CanonicalRecord>(entry) {
                Ok(record) if record.has_key() => {
                    state.insert(record.work_email.clone(), record);
                }
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            tracing::warn!(dropped, path = %self.path.display(), "ignored backup entries without work_email");
        }
        Ok(state)
    }

    /// Persist `state` as a pretty-printed JSON array
    ///
    /// Writes a temporary file next to the target and renames it into place,
    /// so readers never observe a half-written backup.
    ///
    /// # Errors
    /// - `BackupError::Serialize` if encoding fails
    /// - `BackupError::Io` if the temporary file cannot be written or renamed
    pub fn save(&self, state: &BackupState) -> Result<(), BackupError> {
        let records: Vec<&CanonicalRecord> = state.values().collect();
        let bytes = to_pretty_json(&records)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| BackupError::io_error(dir, e))?;

        let mut temp =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| BackupError::io_error(dir, e))?;
        temp.write_all(&bytes)
            .map_err(|e| BackupError::io_error(temp.path(), e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| BackupError::io_error(temp.path(), e))?;
        temp.persist(&self.path)
            .map_err(|e| BackupError::io_error(&self.path, e.error))?;

        tracing::debug!(records = records.len(), path = %self.path.display(), "backup written");
        Ok(())
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, BackupError> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(INDENT));
    value
        .serialize(&mut serializer)
        .map_err(BackupError::Serialize)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(email: &str, name: &str) -> CanonicalRecord {
        CanonicalRecord {
            name: name.to_string(),
            work_email: email.to_string(),
            work_phone: String::new(),
            job_title: String::new(),
            department_name: Some("Ventas".to_string()),
            photo_name: crate::record::image_filename(email),
            manager: None,
            mentor: None,
            company: None,
        }
    }

    #[test]
    fn missing_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = BackupStore::new(dir.path().join("absent.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hr_backup.json");
        std::fs::write(&path, "[{\"work_email\": ").unwrap();

        let err = BackupStore::new(&path).load().unwrap_err();
        assert!(matches!(err, BackupError::Parse { .. }));
    }

    #[test]
    fn non_array_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hr_backup.json");
        std::fs::write(&path, "{\"work_email\": \"a@x.com\"}").unwrap();

        let err = BackupStore::new(&path).load().unwrap_err();
        assert!(matches!(err, BackupError::Parse { .. }));
    }

    #[test]
    fn drops_entries_without_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hr_backup.json");
        std::fs::write(
            &path,
            r#"[
                {"name": "Keep", "work_email": "keep@x.com"},
                {"name": "No email"},
                {"name": "Blank", "work_email": ""},
                {"name": "False", "work_email": false},
                7
            ]"#,
        )
        .unwrap();

        let state = BackupStore::new(&path).load().unwrap();
        assert_eq!(state.keys().collect::<Vec<_>>(), vec!["keep@x.com"]);
        assert_eq!(state["keep@x.com"].name, "Keep");
    }

    #[test]
    fn save_then_load_preserves_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = BackupStore::new(dir.path().join("nested/hr_backup.json"));

        let mut state = BackupState::new();
        state.insert("b@x.com".into(), record("b@x.com", "Bea"));
        state.insert("a@x.com".into(), record("a@x.com", "Ana"));

        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), state);
    }

    #[test]
    fn saved_file_is_sorted_pretty_and_unescaped() {
        let dir = tempfile::tempdir().unwrap();
        let store = BackupStore::new(dir.path().join("hr_backup.json"));

        let mut state = BackupState::new();
        state.insert("z@x.com".into(), record("z@x.com", "Zoë Núñez"));
        state.insert("a@x.com".into(), record("a@x.com", "Ana"));
        store.save(&state).unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.starts_with("[\n    {\n        \"name\": \"Ana\""));
        assert!(text.contains("Zoë Núñez"));
        assert!(!text.contains("photo_b64"));
        assert!(text.find("a@x.com").unwrap() < text.find("z@x.com").unwrap());
    }

    #[test]
    fn save_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = BackupStore::new(dir.path().join("hr_backup.json"));

        let mut state = BackupState::new();
        state.insert("a@x.com".into(), record("a@x.com", "Ana"));
        state.insert("b@x.com".into(), record("b@x.com", "Bea"));
        store.save(&state).unwrap();

        state.remove("b@x.com");
        store.save(&state).unwrap();

        assert_eq!(store.load().unwrap().len(), 1);
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
