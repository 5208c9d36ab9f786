//! Cache decision and ledger persistence behaviour.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use gin_release::download::{EtagLedger, JsonFileStore, LedgerStore, is_cached};

/// In-memory store so tests can observe persisted state.
#[derive(Clone, Default)]
struct MemStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl LedgerStore for MemStore {
    fn load(&self) -> gin_release::Result<HashMap<String, String>> {
        Ok(self.entries.lock().unwrap().clone())
    }

    fn save(&self, entries: &HashMap<String, String>) -> gin_release::Result<()> {
        *self.entries.lock().unwrap() = entries.clone();
        Ok(())
    }
}

#[test]
fn matching_validator_and_size_is_a_hit() {
    assert!(is_cached(Some(100), Some(100), Some("abc"), Some("abc")));
}

#[test]
fn any_mismatch_forces_a_refetch() {
    // size differs
    assert!(!is_cached(Some(99), Some(100), Some("abc"), Some("abc")));
    // validator changed on the server
    assert!(!is_cached(Some(100), Some(100), Some("abc"), Some("def")));
    // no prior validator
    assert!(!is_cached(Some(100), Some(100), None, Some("abc")));
    // server sent no validator
    assert!(!is_cached(Some(100), Some(100), Some("abc"), None));
    // no local file
    assert!(!is_cached(None, Some(100), Some("abc"), Some("abc")));
    // server did not report a size
    assert!(!is_cached(Some(100), None, Some("abc"), Some("abc")));
}

#[test]
fn ledger_updates_are_memory_only_until_persist() {
    let store = MemStore::default();

    let mut ledger = EtagLedger::load(Box::new(store.clone())).unwrap();
    ledger.insert("https://example.org/a", "v1");
    assert_eq!(ledger.get("https://example.org/a"), Some("v1"));
    assert!(store.entries.lock().unwrap().is_empty());

    ledger.persist().unwrap();
    assert_eq!(
        store.entries.lock().unwrap().get("https://example.org/a"),
        Some(&"v1".to_string())
    );

    // a fresh load sees the persisted entry
    let reloaded = EtagLedger::load(Box::new(store)).unwrap();
    assert_eq!(reloaded.get("https://example.org/a"), Some("v1"));
}

#[test]
fn validator_change_replaces_the_stored_entry() {
    let store = MemStore::default();
    let mut ledger = EtagLedger::load(Box::new(store.clone())).unwrap();

    ledger.insert("https://example.org/a", "v1");
    ledger.insert("https://example.org/a", "v2");
    ledger.persist().unwrap();

    assert_eq!(
        store.entries.lock().unwrap().get("https://example.org/a"),
        Some(&"v2".to_string())
    );
}

#[test]
fn file_store_starts_empty_and_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::in_dir(dir.path());

    // no file yet
    assert!(store.load().unwrap().is_empty());

    let mut entries = HashMap::new();
    entries.insert("https://example.org/tool.tar.gz".into(), "\"etag\"".into());
    store.save(&entries).unwrap();

    assert!(dir.path().join("etags.json").is_file());
    assert_eq!(store.load().unwrap(), entries);
}
