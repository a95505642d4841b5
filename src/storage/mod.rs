use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use log::{trace, warn};

use crate::error::StorageError;

/// Store key for the resumable session snapshot (versioned JSON object).
pub const KEY_SESSION_SNAPSHOT: &str = "sessionSnapshot";
/// Store key for the leaderboard (JSON array, capped and time-sorted).
pub const KEY_LEADERBOARD: &str = "leaderboard";
/// Store key for the last-entered player name (plain string, prefill only).
pub const KEY_LAST_PLAYER_NAME: &str = "lastPlayerName";

/// String-keyed persistent store, the one primitive the core needs from its
/// environment for saved games and scores. A failed read is indistinguishable
/// from an absent key; a failed write leaves the previously stored value
/// intact.
pub trait KeyValueStore {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str);
}

/// One file per key under a data directory. Writes go to a sibling temp file
/// first and are renamed into place, so a reader never observes a half-written
/// value.
#[derive(Debug)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: PathBuf) -> Self {
        if !data_dir.exists() {
            if let Err(e) = fs::create_dir_all(&data_dir) {
                warn!(target: "storage", "could not create data dir {:?}: {}", data_dir, e);
            }
        }
        Self { data_dir }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.key_path(key)).ok()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.key_path(key);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.data_dir.join(format!("{}.json.tmp", key));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        trace!(target: "storage", "wrote {} ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        let _ = fs::remove_file(self.key_path(key));
    }
}

/// HashMap-backed store for tests and headless drivers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("slidefest-test-{}", Uuid::new_v4()))
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = scratch_dir();
        let mut store = FileStore::new(dir.clone());

        assert_eq!(store.read(KEY_LAST_PLAYER_NAME), None);
        store.write(KEY_LAST_PLAYER_NAME, "ada").unwrap();
        assert_eq!(store.read(KEY_LAST_PLAYER_NAME).as_deref(), Some("ada"));

        store.remove(KEY_LAST_PLAYER_NAME);
        assert_eq!(store.read(KEY_LAST_PLAYER_NAME), None);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_file_store_overwrite_replaces_whole_value() {
        let dir = scratch_dir();
        let mut store = FileStore::new(dir.clone());

        store.write(KEY_LEADERBOARD, "[1,2,3]").unwrap();
        store.write(KEY_LEADERBOARD, "[]").unwrap();
        assert_eq!(store.read(KEY_LEADERBOARD).as_deref(), Some("[]"));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_file_store_leaves_no_temp_file_behind() {
        let dir = scratch_dir();
        let mut store = FileStore::new(dir.clone());

        store.write(KEY_SESSION_SNAPSHOT, "{}").unwrap();
        let leftovers: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map(|x| x == "tmp").unwrap_or(false))
            .collect();
        assert!(leftovers.is_empty());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        store.write("k", "v").unwrap();
        assert_eq!(store.read("k").as_deref(), Some("v"));
        store.remove("k");
        assert_eq!(store.read("k"), None);
    }
}
