//! Key-value backends with per-key expiry.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use super::clock::{Clock, SystemClock};
use crate::error::StoreError;

/// A string key-value store where every record expires.
///
/// A zero TTL stores a record that is already expired.
pub trait PaletteStore {
    /// Returns the value for `key`, or `None` if absent or expired.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key` for `ttl`.
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: PaletteStore + ?Sized> PaletteStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        (**self).set(key, value, ttl)
    }
    fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}

impl<T: PaletteStore + ?Sized> PaletteStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        (**self).set(key, value, ttl)
    }
    fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}

fn expires_at(now: i64, ttl: Duration) -> i64 {
    now.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX))
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-process store.
///
/// Clones share the same map, so a clone handed to a [`PaletteCache`] can be
/// inspected from a test.
///
/// [`PaletteCache`]: super::PaletteCache
pub struct MemoryStore<C: Clock = SystemClock> {
    records: Arc<Mutex<HashMap<String, (String, i64)>>>,
    clock: Arc<C>,
}

impl<C: Clock> Clone for MemoryStore<C> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl MemoryStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self::with_shared_clock(Arc::new(clock))
    }

    pub fn with_shared_clock(clock: Arc<C>) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    /// Number of records held, expired or not.
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, (String, i64)>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

impl<C: Clock> PaletteStore for MemoryStore<C> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = self.clock.now();
        let mut records = self.lock()?;
        match records.get(key) {
            Some((_, expires)) if *expires <= now => {
                records.remove(key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let expires = expires_at(self.clock.now(), ttl);
        self.lock()?
            .insert(key.to_string(), (value.to_string(), expires));
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

// =============================================================================
// FileStore
// =============================================================================

/// First 16 bytes of the key's SHA-256, hex encoded.
fn key_digest(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let digest = hasher.finalize();
    digest[..16].iter().map(|b| format!("{b:02x}")).collect()
}

#[derive(Serialize, Deserialize)]
struct FileRecord {
    key: String,
    expires_at: i64,
    value: String,
}

/// Directory-backed store, one JSON file per key.
///
/// File names are derived from a SHA-256 of the key, so arbitrary stylesheet
/// paths are safe to use as keys. Each record carries its full key and a
/// mismatch reads as absent. Expired files are removed when read.
///
/// Writes go through a uniquely named temp file that is renamed into place,
/// so concurrent writers to one key end with one complete record.
pub struct FileStore<C: Clock = SystemClock> {
    dir: PathBuf,
    clock: C,
}

impl FileStore<SystemClock> {
    /// Opens (and creates if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open_with_clock(dir, SystemClock)
    }
}

impl<C: Clock> FileStore<C> {
    pub fn open_with_clock(dir: impl Into<PathBuf>, clock: C) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir, clock })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key_digest(key)))
    }
}

impl<C: Clock> PaletteStore for FileStore<C> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.record_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let record: FileRecord = serde_json::from_str(&content)?;
        if record.key != key {
            return Ok(None);
        }
        if record.expires_at <= self.clock.now() {
            self.delete(key)?;
            return Ok(None);
        }
        Ok(Some(record.value))
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let record = FileRecord {
            key: key.to_string(),
            expires_at: expires_at(self.clock.now(), ttl),
            value: value.to_string(),
        };
        let path = self.record_path(key);
        let content = serde_json::to_string(&record)?;

        let io_err = |source: io::Error| StoreError::Io {
            path: self.dir.clone(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        tmp.write_all(content.as_bytes()).map_err(io_err)?;
        tmp.flush().map_err(io_err)?;
        tmp.persist(&path)
            .map(|_| ())
            .map_err(|err| StoreError::Io {
                path,
                source: err.error,
            })
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.record_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}
