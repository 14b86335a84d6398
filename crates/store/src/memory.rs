//! In-memory step store for tests and storage-less contexts.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::{storage_key, StepStore};

/// A `HashMap`-backed [`StepStore`].
///
/// This is what a server-side render path gets: writes are accepted but
/// vanish with the instance, reads after a restart see nothing.
#[derive(Debug, Default)]
pub struct MemoryStepStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStepStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StepStore for MemoryStepStore {
    fn read(&self, namespace: &[&str]) -> Option<String> {
        let entries = self.entries.lock().ok()?;
        entries.get(&storage_key(namespace)).cloned()
    }

    fn write(&self, namespace: &[&str], value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(storage_key(namespace), value.to_string());
        }
    }

    fn remove(&self, namespace: &[&str]) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(&storage_key(namespace));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_read_remove() {
        let store = MemoryStepStore::new();
        assert_eq!(store.read(&["a", "b"]), None);
        store.write(&["a", "b"], "1");
        assert_eq!(store.read(&["a", "b"]), Some("1".to_string()));
        store.write(&["a", "b"], "2");
        assert_eq!(store.read(&["a", "b"]), Some("2".to_string()));
        store.remove(&["a", "b"]);
        assert_eq!(store.read(&["a", "b"]), None);
    }

    #[test]
    fn remove_missing_key_is_noop() {
        let store = MemoryStepStore::new();
        store.remove(&["nothing", "here"]);
        assert_eq!(store.read(&["nothing", "here"]), None);
    }
}
