//! Key/value persistence for descriptor timing state.
//!
//! Descriptors survive process restarts by writing their armed/fired
//! timestamps through a [`StateStore`] the moment they change. Keys are
//! namespaced by descriptor name, so distinct descriptors never collide.

use crate::error::{Result, StoreError};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::warn;

/// Store key for a descriptor's timer-start timestamp.
#[must_use]
pub fn timer_started_key(name: &str) -> String {
    format!("{name}.timerStartedDate")
}

/// Store key for a descriptor's last-fired timestamp.
#[must_use]
pub fn last_fired_key(name: &str) -> String {
    format!("{name}.lastFiredDate")
}

/// Synchronous key/value store for descriptor timestamps.
///
/// An absent key is the normal "never armed / never fired" state, not an
/// error. Implementations must be safe for concurrent access; keys are
/// namespaced by descriptor name so distinct descriptors never contend on
/// the same key.
pub trait StateStore: Send + Sync {
    /// Returns the stored timestamp for `key`, if any.
    fn get(&self, key: &str) -> Option<DateTime<Utc>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// The write must be durable before this returns; callers rely on it to
    /// survive an immediate crash.
    fn set(&self, key: &str, value: DateTime<Utc>);

    /// Removes the value under `key`. Removing an absent key is a no-op.
    fn remove(&self, key: &str);
}

/// In-process store backed by a shared map.
///
/// State does not survive the process; useful for tests and for hosts that
/// persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl MemoryStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> Option<DateTime<Utc>> {
        self.state.read().unwrap().get(key).copied()
    }

    fn set(&self, key: &str, value: DateTime<Utc>) {
        self.state.write().unwrap().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.state.write().unwrap().remove(key);
    }
}

impl Clone for MemoryStateStore {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

/// File-backed store holding all timestamps in one JSON map.
///
/// Every mutation rewrites the file before returning, so a crash immediately
/// after a fire cannot lose the fire. The map is small (two keys per
/// descriptor) and local, so the rewrite stays cheap.
#[derive(Debug)]
pub struct JsonFileStateStore {
    path: PathBuf,
    state: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl JsonFileStateStore {
    /// Opens the store at `path`, loading any previously persisted state.
    ///
    /// A missing file is the empty state, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or decoded.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|e| StoreError::Io {
                path: path.display().to_string(),
                details: e.to_string(),
            })?;
            serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
                path: path.display().to_string(),
                details: e.to_string(),
            })?
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(state)),
        })
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the current state out to the backing file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the file write fails.
    pub fn flush(&self) -> Result<(), StoreError> {
        let state = self.state.read().unwrap();
        self.write_out(&state)
    }

    fn write_out(&self, state: &HashMap<String, DateTime<Utc>>) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(state).map_err(|e| StoreError::Corrupt {
            path: self.path.display().to_string(),
            details: e.to_string(),
        })?;
        fs::write(&self.path, raw).map_err(|e| StoreError::Io {
            path: self.path.display().to_string(),
            details: e.to_string(),
        })?;
        Ok(())
    }
}

impl StateStore for JsonFileStateStore {
    fn get(&self, key: &str) -> Option<DateTime<Utc>> {
        self.state.read().unwrap().get(key).copied()
    }

    fn set(&self, key: &str, value: DateTime<Utc>) {
        let mut state = self.state.write().unwrap();
        state.insert(key.to_string(), value);
        if let Err(report) = self.write_out(&state) {
            warn!(key, %report, "state store write failed");
        }
    }

    fn remove(&self, key: &str) {
        let mut state = self.state.write().unwrap();
        state.remove(key);
        if let Err(report) = self.write_out(&state) {
            warn!(key, %report, "state store write failed");
        }
    }
}

impl Clone for JsonFileStateStore {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            state: Arc::clone(&self.state),
        }
    }
}
