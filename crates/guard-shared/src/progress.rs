//! Progress history: a capped, ordered log of finished sessions.
//!
//! The log is stored as one JSON array under a fixed key. Insertion order is
//! chronological and the cap is enforced on write by evicting the oldest
//! entries. Statistics are always recomputed from the log on read.

use crate::achievements::{check_achievements, Achievement};
use crate::error::GuardError;
use crate::metrics::SessionMetrics;
use crate::stats::ProgressStats;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Key-value persistence the store needs; nothing more
pub trait LogStorage {
    fn get(&self, key: &str) -> Result<Option<String>, GuardError>;
    fn set(&self, key: &str, value: &str) -> Result<(), GuardError>;
    fn remove(&self, key: &str) -> Result<(), GuardError>;
}

/// One `<key>.json` file per key under a data directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl LogStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, GuardError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), GuardError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);

        // Write to temp file then rename so readers never see a partial log
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, value)?;
        fs::rename(&temp_path, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), GuardError> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// In-process storage for tests and hosts without a filesystem
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, GuardError> {
        self.entries
            .lock()
            .map_err(|_| GuardError::Storage("memory storage lock poisoned".to_string()))
    }
}

impl LogStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, GuardError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), GuardError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), GuardError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Capped session log over any [`LogStorage`]
#[derive(Debug)]
pub struct ProgressStore<S: LogStorage> {
    storage: S,
    key: String,
    capacity: usize,
}

impl ProgressStore<FileStorage> {
    /// File-backed store under `data_dir`
    pub fn open(data_dir: impl AsRef<Path>) -> Self {
        Self::new(FileStorage::new(data_dir))
    }
}

impl<S: LogStorage> ProgressStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            key: crate::STORE_KEY.to_string(),
            capacity: crate::MAX_SESSIONS,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Append a finished session, evicting the oldest beyond capacity
    pub fn log(&self, session: &SessionMetrics) -> Result<(), GuardError> {
        let mut sessions = self.get_sessions();
        sessions.push(session.clone());

        if sessions.len() > self.capacity {
            let excess = sessions.len() - self.capacity;
            sessions.drain(..excess);
            debug!("Evicted {} oldest session(s) from progress log", excess);
        }

        let content = serde_json::to_string(&sessions)?;
        self.storage.set(&self.key, &content)
    }

    /// Full log, oldest first. Unreadable or malformed logs read as empty.
    pub fn get_sessions(&self) -> Vec<SessionMetrics> {
        let content = match self.storage.get(&self.key) {
            Ok(Some(content)) => content,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Progress log unreadable, treating as empty: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!("Progress log malformed, treating as empty: {}", e);
                Vec::new()
            }
        }
    }

    pub fn get_stats(&self) -> ProgressStats {
        ProgressStats::from_sessions(&self.get_sessions())
    }

    /// Badges earned by the current log
    pub fn achievements(&self) -> Vec<Achievement> {
        check_achievements(&self.get_stats())
    }

    pub fn reset(&self) -> Result<(), GuardError> {
        self.storage.remove(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::tempdir;

    fn session(i: i64) -> SessionMetrics {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap() + Duration::minutes(i);
        let mut m = SessionMetrics::new(start);
        m.punches = i as u64;
        m
    }

    #[test]
    fn test_log_and_read_back() {
        let store = ProgressStore::new(MemoryStorage::new());
        store.log(&session(1)).unwrap();
        store.log(&session(2)).unwrap();

        let sessions = store.get_sessions();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].punches, 1);
        assert_eq!(sessions[1].punches, 2);
    }

    #[test]
    fn test_capacity_evicts_oldest_first() {
        let store = ProgressStore::new(MemoryStorage::new()).with_capacity(3);
        for i in 0..5 {
            store.log(&session(i)).unwrap();
        }
        let punches: Vec<u64> = store.get_sessions().iter().map(|s| s.punches).collect();
        assert_eq!(punches, vec![2, 3, 4]);
    }

    #[test]
    fn test_malformed_log_reads_as_empty() {
        let storage = MemoryStorage::new();
        storage.set(crate::STORE_KEY, "{not json").unwrap();
        let store = ProgressStore::new(storage);

        assert!(store.get_sessions().is_empty());
        assert_eq!(store.get_stats(), ProgressStats::default());

        // Writing over a malformed log starts fresh
        store.log(&session(9)).unwrap();
        assert_eq!(store.get_sessions().len(), 1);
    }

    #[test]
    fn test_cap_not_enforced_on_read() {
        let storage = MemoryStorage::new();
        let oversized: Vec<_> = (0..5).map(session).collect();
        storage
            .set(crate::STORE_KEY, &serde_json::to_string(&oversized).unwrap())
            .unwrap();
        let store = ProgressStore::new(storage).with_capacity(2);
        assert_eq!(store.get_sessions().len(), 5);

        store.log(&session(5)).unwrap();
        assert_eq!(store.get_sessions().len(), 2);
    }

    #[test]
    fn test_reset_clears_log() {
        let store = ProgressStore::new(MemoryStorage::new());
        store.log(&session(1)).unwrap();
        store.reset().unwrap();
        assert!(store.get_sessions().is_empty());
        // Reset on an empty store is fine too
        store.reset().unwrap();
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempdir().unwrap();
        let store = ProgressStore::open(dir.path().join("data"));
        store.log(&session(1)).unwrap();

        let path = store.storage().path_for(crate::STORE_KEY);
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let reopened = ProgressStore::open(dir.path().join("data"));
        assert_eq!(reopened.get_sessions(), store.get_sessions());

        reopened.reset().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_separate_keys_do_not_share_logs() {
        let dir = tempdir().unwrap();
        let a = ProgressStore::open(dir.path()).with_key("alice");
        let b = ProgressStore::open(dir.path()).with_key("bob");
        a.log(&session(1)).unwrap();
        assert_eq!(a.get_sessions().len(), 1);
        assert!(b.get_sessions().is_empty());
    }
}
