//! Disk-backed step store.
//!
//! The production stand-in for browser local storage: a single JSON
//! document (`steps.json`) in a caller-chosen directory. Every failure mode
//! an end-user machine can produce — missing directory, permission denied,
//! a corrupt or truncated file — degrades to "value absent" with a warning,
//! matching the [`StepStore`] contract.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::{storage_key, StepStore};

const STORE_FILE: &str = "steps.json";

/// A [`StepStore`] persisted as one JSON document on disk.
pub struct FileStepStore {
    path: PathBuf,
    // Serializes load-modify-flush cycles within this process. Cross-process
    // and cross-"tab" writers still race with last-write-wins, which is the
    // accepted storage semantics.
    guard: Mutex<()>,
}

impl FileStepStore {
    /// Create a store rooted at `dir`. The directory is created lazily on
    /// first write; a missing directory just means empty reads.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(STORE_FILE),
            guard: Mutex::new(()),
        }
    }

    fn load(&self) -> BTreeMap<String, String> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Step store unreadable, treating as empty");
                return BTreeMap::new();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Step store corrupt, treating as empty");
                BTreeMap::new()
            }
        }
    }

    fn flush(&self, entries: &BTreeMap<String, String>) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!(path = %parent.display(), error = %e, "Cannot create step store directory, dropping write");
                return;
            }
        }
        let json = match serde_json::to_vec_pretty(entries) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot serialize step store, dropping write");
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, json) {
            tracing::warn!(path = %self.path.display(), error = %e, "Cannot write step store, dropping write");
        }
    }
}

impl StepStore for FileStepStore {
    fn read(&self, namespace: &[&str]) -> Option<String> {
        let _guard = self.guard.lock().ok()?;
        self.load().get(&storage_key(namespace)).cloned()
    }

    fn write(&self, namespace: &[&str], value: &str) {
        let Ok(_guard) = self.guard.lock() else {
            return;
        };
        let mut entries = self.load();
        entries.insert(storage_key(namespace), value.to_string());
        self.flush(&entries);
    }

    fn remove(&self, namespace: &[&str]) {
        let Ok(_guard) = self.guard.lock() else {
            return;
        };
        let mut entries = self.load();
        if entries.remove(&storage_key(namespace)).is_some() {
            self.flush(&entries);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStepStore::new(dir.path());
            store.write(&["application", "abc", "current"], "3");
        }
        let store = FileStepStore::new(dir.path());
        assert_eq!(
            store.read(&["application", "abc", "current"]),
            Some("3".to_string())
        );
    }

    #[test]
    fn missing_directory_reads_empty() {
        let store = FileStepStore::new("/nonexistent/path/for/tests");
        assert_eq!(store.read(&["application", "abc", "current"]), None);
    }

    #[test]
    fn corrupt_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(STORE_FILE), b"{ not json").unwrap();
        let store = FileStepStore::new(dir.path());
        assert_eq!(store.read(&["application", "abc", "current"]), None);
    }

    #[test]
    fn corrupt_file_recovers_on_write() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(STORE_FILE), b"garbage").unwrap();
        let store = FileStepStore::new(dir.path());
        store.write(&["k"], "v");
        assert_eq!(store.read(&["k"]), Some("v".to_string()));
    }

    #[test]
    fn remove_deletes_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStepStore::new(dir.path());
        store.write(&["a"], "1");
        store.write(&["b"], "2");
        store.remove(&["a"]);
        assert_eq!(store.read(&["a"]), None);
        assert_eq!(store.read(&["b"]), Some("2".to_string()));
    }
}
