//! Local persistence of sessions, keyed by image name.
//!
//! Storage is best effort: callers go through [`save_quietly`] and
//! [`load_quietly`], which log failures and carry on with the in-memory
//! session.

mod auto_save;

pub use auto_save::AutoSaveManager;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::constants::STORAGE_PREFIX;
use crate::format::{FormatError, SessionRecord, parse_record};

/// Storage key for an image name.
pub fn storage_key(image_name: &str) -> String {
    format!("{}{}", STORAGE_PREFIX, image_name)
}

/// A place sessions are written to between runs.
pub trait SessionStorage {
    fn save(&mut self, record: &SessionRecord) -> Result<(), FormatError>;

    /// Stored record for `image_name`, or None when nothing was saved.
    fn load(&self, image_name: &str) -> Result<Option<SessionRecord>, FormatError>;

    fn clear(&mut self, image_name: &str) -> Result<(), FormatError>;
}

/// Save, logging and swallowing any failure. Returns whether it succeeded.
pub fn save_quietly(storage: &mut dyn SessionStorage, record: &SessionRecord) -> bool {
    match storage.save(record) {
        Ok(()) => {
            log::debug!(
                "Persisted {} annotations for '{}'",
                record.annotations.len(),
                record.image_name
            );
            true
        }
        Err(e) => {
            log::warn!("Failed to persist session for '{}': {}", record.image_name, e);
            false
        }
    }
}

/// Load, treating any failure as "nothing stored".
pub fn load_quietly(storage: &dyn SessionStorage, image_name: &str) -> Option<SessionRecord> {
    match storage.load(image_name) {
        Ok(record) => record,
        Err(e) => {
            log::warn!("Ignoring unreadable stored session for '{}': {}", image_name, e);
            None
        }
    }
}

// ============================================================================
// Filesystem
// ============================================================================

/// One JSON file per image under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data_dir>/mothra/sessions`, falling back to `~/.local/share`.
    pub fn default_dir() -> Option<PathBuf> {
        if let Some(data_dir) = dirs::data_dir() {
            Some(data_dir.join("mothra").join("sessions"))
        } else {
            dirs::home_dir().map(|home| home.join(".local").join("share").join("mothra").join("sessions"))
        }
    }

    pub fn at_default_dir() -> Option<Self> {
        Self::default_dir().map(Self::new)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, image_name: &str) -> PathBuf {
        let key: String = storage_key(image_name)
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        self.dir.join(format!("{}.json", key))
    }
}

impl SessionStorage for FileStorage {
    fn save(&mut self, record: &SessionRecord) -> Result<(), FormatError> {
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_vec(record)?;
        std::fs::write(self.path_for(&record.image_name), json)?;
        Ok(())
    }

    fn load(&self, image_name: &str) -> Result<Option<SessionRecord>, FormatError> {
        let path = self.path_for(image_name);
        if !path.exists() {
            log::debug!("No stored session at {:?}", path);
            return Ok(None);
        }
        let data = std::fs::read(&path)?;
        parse_record(&data).map(Some)
    }

    fn clear(&mut self, image_name: &str) -> Result<(), FormatError> {
        match std::fs::remove_file(self.path_for(image_name)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Process-local storage, for tests and for runs without a data directory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStorage for MemoryStorage {
    fn save(&mut self, record: &SessionRecord) -> Result<(), FormatError> {
        let json = serde_json::to_string(record)?;
        self.entries.insert(storage_key(&record.image_name), json);
        Ok(())
    }

    fn load(&self, image_name: &str) -> Result<Option<SessionRecord>, FormatError> {
        self.entries
            .get(&storage_key(image_name))
            .map(|json| parse_record(json.as_bytes()))
            .transpose()
    }

    fn clear(&mut self, image_name: &str) -> Result<(), FormatError> {
        self.entries.remove(&storage_key(image_name));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Annotation, BoundingBox, ImageInfo, Session};

    fn record(name: &str) -> SessionRecord {
        SessionRecord::from_session(&Session::new(
            ImageInfo::new(name, 64, 32),
            vec![Annotation::new("a".into(), 1, BoundingBox::new(1.0, 2.0, 10.0, 10.0))],
        ))
    }

    #[test]
    fn test_storage_key_prefix() {
        assert_eq!(storage_key("page.png"), "mothra-session-page.png");
    }

    #[test]
    fn test_memory_storage_round() {
        let mut storage = MemoryStorage::new();
        assert!(storage.load("page.png").unwrap().is_none());
        assert!(save_quietly(&mut storage, &record("page.png")));
        assert_eq!(load_quietly(&storage, "page.png"), Some(record("page.png")));
        assert!(load_quietly(&storage, "other.png").is_none());
        storage.clear("page.png").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_file_storage_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("sessions"));
        assert!(storage.load("scans/page.png").unwrap().is_none());

        storage.save(&record("scans/page.png")).unwrap();
        assert!(dir.path().join("sessions").join("mothra-session-scans_page.png.json").exists());
        assert_eq!(storage.load("scans/page.png").unwrap(), Some(record("scans/page.png")));

        storage.clear("scans/page.png").unwrap();
        storage.clear("scans/page.png").unwrap();
        assert!(storage.load("scans/page.png").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        std::fs::write(dir.path().join("mothra-session-page.png.json"), "{ nope").unwrap();
        assert!(storage.load("page.png").is_err());
        assert!(load_quietly(&storage, "page.png").is_none());
    }

    #[test]
    fn test_unwritable_dir_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let mut storage = FileStorage::new(blocker.join("sessions"));
        assert!(!save_quietly(&mut storage, &record("page.png")));
    }
}
