/// Persistent local key-value storage.
///
/// The dashboard keeps its session (token, user, organization, role,
/// permissions) and a handful of preferences in a flat string-to-string
/// store. Two backends exist:
///
/// - [`FileStore`]: a single JSON object on disk, `~/.orgdash/storage.json`
///   by default. Every write replaces the whole file via a temp file and a
///   rename, so a reader never sees half of a batch.
/// - [`MemoryStore`]: process-local, used by tests and one-shot tooling.
///
/// Stores are shared through [`SharedStore`] handles. All methods take
/// `&self`; backends use interior mutability.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};

pub mod token_store;

pub use token_store::TokenStore;

/// A single change in a batch write. `None` removes the key.
pub type Change = (String, Option<String>);

/// Shared handle to a key-value backend.
pub type SharedStore = Arc<dyn KeyValueStore + Send + Sync>;

/// Minimal persistent key-value interface.
pub trait KeyValueStore {
    /// Read a value. Never fails; unreadable storage reads as absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Apply every change in `batch` as one write.
    fn write_batch(&self, batch: Vec<Change>) -> Result<()>;

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.write_batch(vec![(key.to_string(), Some(value.to_string()))])
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.write_batch(vec![(key.to_string(), None)])
    }
}

fn apply_changes(entries: &mut BTreeMap<String, String>, batch: Vec<Change>) {
    for (key, value) in batch {
        match value {
            Some(value) => {
                entries.insert(key, value);
            }
            None => {
                entries.remove(&key);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// JSON-file key-value store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole map. Missing or malformed files read as empty.
    fn read_all(&self) -> BTreeMap<String, String> {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create storage directory {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(entries).context("failed to serialize storage")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn write_batch(&self, batch: Vec<Change>) -> Result<()> {
        let mut entries = self.read_all();
        apply_changes(&mut entries, batch);
        self.write_all(&entries)
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Process-local key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn write_batch(&self, batch: Vec<Change>) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        apply_changes(&mut entries, batch);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("theme"), None);

        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme").as_deref(), Some("dark"));

        store.remove("theme").unwrap();
        assert_eq!(store.get("theme"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn memory_store_batch_applies_sets_and_removals() {
        let store = MemoryStore::new();
        store.set("a", "1").unwrap();
        store
            .write_batch(vec![
                ("a".to_string(), None),
                ("b".to_string(), Some("2".to_string())),
            ])
            .unwrap();
        assert_eq!(store.get("a"), None);
        assert_eq!(store.get("b").as_deref(), Some("2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        FileStore::new(&path).set("token", "abc").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("token").as_deref(), Some("abc"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn file_store_treats_garbage_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        assert_eq!(store.get("token"), None);

        store.set("token", "abc").unwrap();
        assert_eq!(store.get("token").as_deref(), Some("abc"));
    }

    #[test]
    fn file_store_missing_file_reads_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("missing.json"));
        assert_eq!(store.get("anything"), None);
        store.remove("anything").unwrap();
    }
}
