//! Persistent etag ledger for download caching.
//!
//! The ledger maps a URL to the validator token the server reported the last
//! time its body was fetched. It is loaded fully at startup, mutated only in
//! memory while downloads run, and written back wholesale once at the end.
//! A crash mid-run therefore costs at most one redundant re-download on the
//! next run, never a corrupt ledger.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Storage backend for the ledger.
///
/// The production backend is [`JsonFileStore`]; tests inject an in-memory
/// implementation.
pub trait LedgerStore {
    /// Loads all entries. A store with no prior state returns an empty map.
    fn load(&self) -> Result<HashMap<String, String>>;

    /// Replaces the persisted state with `entries`.
    fn save(&self, entries: &HashMap<String, String>) -> Result<()>;
}

/// Ledger file stored as a JSON object under the downloads directory.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The conventional ledger location inside a downloads directory.
    pub fn in_dir(downloads_dir: &Path) -> Self {
        Self::new(downloads_dir.join("etags.json"))
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> Result<HashMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no etag ledger at {}, starting empty", self.path.display());
                Ok(HashMap::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

/// In-memory view of the ledger plus the store it persists through.
pub struct EtagLedger {
    entries: HashMap<String, String>,
    store: Box<dyn LedgerStore>,
}

impl EtagLedger {
    /// Loads the ledger through `store`.
    pub fn load(store: Box<dyn LedgerStore>) -> Result<Self> {
        let entries = store.load()?;
        Ok(Self { entries, store })
    }

    /// Returns the stored validator for `url`, if any.
    pub fn get(&self, url: &str) -> Option<&str> {
        self.entries.get(url).map(String::as_str)
    }

    /// Records `validator` as the last-seen token for `url`. In-memory only;
    /// nothing is written until [`persist`](Self::persist).
    pub fn insert(&mut self, url: &str, validator: &str) {
        self.entries.insert(url.to_string(), validator.to_string());
    }

    /// Writes the full ledger back through the store.
    pub fn persist(&self) -> Result<()> {
        self.store.save(&self.entries)
    }
}
