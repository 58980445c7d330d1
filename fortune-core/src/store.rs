//! Persistence port for durable state.
//!
//! All durable state lives in a namespaced key -> JSON-string map behind the
//! `KvStore` trait. The draw session and the chat manager receive a store
//! handle at construction, which keeps both fully testable against
//! `MemoryStore`. `FileStore` persists the same map as a single JSON file.
//!
//! Corrupt values are never fatal: readers fall back to the recovery value
//! for their key and log a warning.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Storage keys. The names match the original deployment's localStorage keys
/// so existing persisted data round-trips unchanged.
pub mod keys {
    /// Daily draw-session state.
    pub const DRAW_STATE: &str = "bina-fortune-state";

    /// Append-only fortune history, one entry per date.
    pub const FORTUNE_HISTORY: &str = "bina-fortune-history";

    /// All conversations, most-recent-first.
    pub const CONVERSATIONS: &str = "bina-conversations";

    /// System prompt override for the fortune interpreter persona.
    pub const PROMPT_XIAOBI: &str = "bina-prompt-xiaobi";

    /// System prompt override for the memory companion persona.
    pub const PROMPT_XIAONA: &str = "bina-prompt-xiaona";

    /// Letters the user chose to keep, `{date, content}` each.
    pub const SAVED_LETTERS: &str = "bina-saved-letters";

    /// Whether the chat surface has ever been opened.
    pub const CHAT_VISITED: &str = "bina-chat-visited";

    /// Every key, in wipe order.
    pub const ALL: &[&str] = &[
        DRAW_STATE,
        FORTUNE_HISTORY,
        CONVERSATIONS,
        PROMPT_XIAOBI,
        PROMPT_XIAONA,
        SAVED_LETTERS,
        CHAT_VISITED,
    ];
}

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A namespaced key -> JSON-string map surviving across sessions.
///
/// Handles are cheap to clone and share one underlying map, so the draw
/// session and the chat manager can be constructed over the same store.
pub trait KvStore {
    /// Read the raw string stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key` if present.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Read and parse a stored JSON value.
///
/// A missing key yields `None`; a corrupt value is logged and also yields
/// `None`, which callers map to their recovery value.
pub fn read_json<T: DeserializeOwned>(store: &impl KvStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("discarding corrupt value under {key}: {e}");
            None
        }
    }
}

/// Serialize and store a JSON value.
pub fn write_json<T: Serialize>(
    store: &impl KvStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

/// Remove every known key. The destructive reset behind the admin gesture.
pub fn wipe(store: &impl KvStore) -> Result<(), StoreError> {
    for key in keys::ALL {
        store.remove(key)?;
    }
    Ok(())
}

/// An in-memory store for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    map: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.lock().expect("store lock poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.map
            .lock()
            .expect("store lock poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.map.lock().expect("store lock poisoned").remove(key);
        Ok(())
    }
}

/// A store backed by a single JSON file on disk.
///
/// The whole map is rewritten on every mutation; state here is small (a few
/// kilobytes of conversations at most), so simplicity wins over journaling.
/// Concurrent writers from separate processes are out of scope.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    map: Arc<Mutex<BTreeMap<String, String>>>,
}

impl FileStore {
    /// Open a store at `path`, creating parent directories as needed.
    ///
    /// A missing file is an empty store; a corrupt file is logged and
    /// treated as empty rather than failing startup.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let map = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(map) => map,
                Err(e) => {
                    log::warn!("store file {} is corrupt, starting empty: {e}", path.display());
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            map: Arc::new(Mutex::new(map)),
        })
    }

    fn flush(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(map)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.lock().expect("store lock poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.map.lock().expect("store lock poisoned");
        map.insert(key.to_string(), value.to_string());
        self.flush(&map)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut map = self.map.lock().expect("store lock poisoned");
        if map.remove(key).is_some() {
            self.flush(&map)?;
        }
        Ok(())
    }
}
