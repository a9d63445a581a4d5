//! Key-value persistence backends
//!
//! Everything the server remembers across restarts goes through the
//! [`KeyValueStore`] trait: string keys to string values, nothing more. The
//! key schema and record formats live in [`timer_store`].

pub mod timer_store;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::{fs, io};

use tracing::warn;

pub use timer_store::TimerStore;

/// String-keyed persistence collaborator
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory store, used in tests and as a no-persistence fallback
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}

/// File-backed store: one JSON object per file, loaded once at open and
/// rewritten after every change. Values are small (a handful of timers), so
/// rewriting the whole map is cheaper than being clever. I/O failures are
/// logged and absorbed; persistence is best-effort by design.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file is missing or
    /// unreadable
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(map) => map,
                Err(e) => {
                    warn!("Ignoring malformed store file {}: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!("Failed to read store file {}: {}", path.display(), e);
                HashMap::new()
            }
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn flush(&self, entries: &HashMap<String, String>) {
        match serde_json::to_string_pretty(entries) {
            Ok(text) => {
                if let Err(e) = fs::write(&self.path, text) {
                    warn!("Failed to write store file {}: {}", self.path.display(), e);
                }
            }
            Err(e) => warn!("Failed to serialize store: {}", e),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
            self.flush(&entries);
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            if entries.remove(key).is_some() {
                self.flush(&entries);
            }
        }
    }
}
