//! Document read/write helpers and the in-memory reference store.

use crate::ProgressStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::rc::Rc;

/// Read and parse one document. Absent keys, unreadable storage, and corrupt
/// payloads all yield `None` so the caller substitutes its default; corrupt
/// data is discarded on the next successful write.
#[must_use]
pub fn read_doc<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: ProgressStore,
{
    match store.get(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(doc) => Some(doc),
            Err(err) => {
                log::warn!("discarding corrupt document at {key}: {err}");
                None
            }
        },
        Ok(None) => None,
        Err(err) => {
            log::warn!("storage read failed for {key}: {err}");
            None
        }
    }
}

/// Serialize fully, then write as one document. Failures are logged and
/// reported as `false`; the previous durable value stays in place and the
/// caller keeps serving its in-memory state.
pub fn write_doc<T, S>(store: &S, key: &str, doc: &T) -> bool
where
    T: Serialize,
    S: ProgressStore,
{
    let raw = match serde_json::to_string(doc) {
        Ok(raw) => raw,
        Err(err) => {
            log::warn!("failed to serialize document for {key}: {err}");
            return false;
        }
    };
    match store.set(key, &raw) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("storage write failed for {key}: {err}");
            false
        }
    }
}

/// Shared in-memory store for native runs and tests.
///
/// Clones share one backing map, so a clone behaves like a second tab over
/// the same origin's storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing serialization. Used to stage corrupt or
    /// externally written documents.
    pub fn seed_raw(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl ProgressStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        count: u32,
    }

    #[test]
    fn roundtrips_a_document() {
        let store = MemoryStore::new();
        assert!(write_doc(&store, "k", &Doc { count: 7 }));
        assert_eq!(read_doc::<Doc, _>(&store, "k"), Some(Doc { count: 7 }));
    }

    #[test]
    fn absent_key_reads_as_none() {
        let store = MemoryStore::new();
        assert_eq!(read_doc::<Doc, _>(&store, "missing"), None);
    }

    #[test]
    fn corrupt_payload_reads_as_none() {
        let store = MemoryStore::new();
        store.seed_raw("k", "{not json");
        assert_eq!(read_doc::<Doc, _>(&store, "k"), None);
    }

    #[test]
    fn clones_share_one_backing_map() {
        let store = MemoryStore::new();
        let other_tab = store.clone();
        assert!(write_doc(&store, "k", &Doc { count: 1 }));
        assert_eq!(read_doc::<Doc, _>(&other_tab, "k"), Some(Doc { count: 1 }));
    }
}
