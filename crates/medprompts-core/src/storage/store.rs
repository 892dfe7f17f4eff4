//! Persisted store adapter.
//!
//! Typed JSON documents over a key-value backend. Reads never fail: a missing
//! or undecodable document yields the caller's default. Writes never fail
//! either: errors are logged and the in-memory state stays authoritative for
//! the rest of the session.

use std::cell::RefCell;
use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Database;

/// Stable key names, one per engine.
pub mod keys {
    pub const PROGRESS: &str = "progress-state";
    pub const BADGES: &str = "badge-state";
    pub const WEEKLY_CHALLENGE: &str = "weekly-challenge-state";
    pub const POMODORO_HISTORY: &str = "pomodoro-history";
    pub const POMODORO_TIMER: &str = "pomodoro-timer";

    pub const ALL: [&str; 5] = [
        PROGRESS,
        BADGES,
        WEEKLY_CHALLENGE,
        POMODORO_HISTORY,
        POMODORO_TIMER,
    ];
}

type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// Raw string storage a [`Store`] sits on.
pub trait KvBackend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError>;
    fn set(&self, key: &str, value: &str) -> Result<(), BackendError>;
    fn remove(&self, key: &str) -> Result<(), BackendError>;
}

impl KvBackend for Database {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.kv_get(key)?)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        Ok(self.kv_set(key, value)?)
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        Ok(self.kv_delete(key)?)
    }
}

/// Process-local backend. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Typed JSON document store.
pub struct Store {
    backend: Box<dyn KvBackend>,
}

impl Store {
    pub fn new(backend: impl KvBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Store over a fresh [`MemoryBackend`].
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    pub fn backend(&self) -> &dyn KvBackend {
        self.backend.as_ref()
    }

    /// Load the document under `key`, or `default` if it is missing or corrupt.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.backend.get(key) {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(key, error = %e, "discarding corrupt persisted state");
                    default
                }
            },
            Ok(None) => default,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read persisted state");
                default
            }
        }
    }

    /// Serialize and write `value` under `key`. Returns whether it was written.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to serialize state");
                return false;
            }
        };
        match self.backend.set(key, &json) {
            Ok(()) => {
                tracing::trace!(key, bytes = json.len(), "state saved");
                true
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to persist state");
                false
            }
        }
    }

    /// Remove the document under `key`. Returns whether it was removed.
    pub fn clear(&self, key: &str) -> bool {
        match self.backend.remove(key) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to clear state");
                false
            }
        }
    }
}
