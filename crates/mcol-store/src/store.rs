#![forbid(unsafe_code)]

//! Key-value persistence backends.
//!
//! A [`StyleStore`] maps string keys to JSON text, the way a browser's local
//! storage does. Backends know nothing about records; [`crate::records`]
//! layers typed access on top.
//!
//! | Backend | Durability |
//! |---|---|
//! | [`MemoryStore`] | process lifetime |
//! | [`FileStore`] | one JSON object file, rewritten on every mutation |
//! | [`Namespaced`] | wraps another backend and prefixes every key |

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// Prefix shared by every key this system writes.
pub const NAMESPACE: &str = "sc-";

/// Errors raised by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error reading or writing the backing file.
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    /// A value or the backing file could not be encoded or decoded.
    #[error("storage JSON failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Namespaced string key → JSON text persistence.
///
/// There are no cross-key transactions: every `set` and `remove` stands on its
/// own.
pub trait StyleStore {
    /// Raw JSON text stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: String) -> StorageResult<()>;

    /// Delete `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> StorageResult<()>;

    /// Every key currently stored, in ascending order.
    fn keys(&self) -> Vec<String>;

    /// Whether `key` is present.
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

impl<S: StyleStore + ?Sized> StyleStore for &mut S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }
}

impl<S: StyleStore + ?Sized> StyleStore for Box<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }
}

/// In-memory backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StyleStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> StorageResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// File-backed store: a single JSON object of key → JSON text.
///
/// The whole map is held in memory and written back atomically (temp file,
/// then rename) after every mutation. The parent directory must exist.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`.
    ///
    /// A missing file is an empty store; a file that is not a JSON object of
    /// strings is an error.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        tracing::debug!(
            target: "mcol.store",
            path = %path.display(),
            keys = entries.len(),
            "opened file store"
        );
        Ok(Self { path, entries })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> StorageResult<()> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        let temp = self.path.with_extension("json.tmp");
        std::fs::write(&temp, json)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }

    /// Undo an unflushed mutation so memory matches disk.
    fn restore(&mut self, key: &str, previous: Option<String>) {
        tracing::warn!(
            target: "mcol.store",
            key,
            path = %self.path.display(),
            "write failed; change rolled back"
        );
        match previous {
            Some(value) => self.entries.insert(key.to_string(), value),
            None => self.entries.remove(key),
        };
    }
}

impl StyleStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> StorageResult<()> {
        let previous = self.entries.insert(key.to_string(), value);
        self.flush().inspect_err(|_| self.restore(key, previous))
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        if let Some(previous) = self.entries.remove(key) {
            self.flush().inspect_err(|_| self.restore(key, Some(previous)))?;
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// Prefixes every key of an inner backend.
///
/// Keys outside the prefix are invisible through this wrapper, so
/// [`Namespaced::clear`] only ever deletes this system's entries.
#[derive(Debug, Clone)]
pub struct Namespaced<S> {
    inner: S,
    prefix: String,
}

impl<S: StyleStore> Namespaced<S> {
    /// Wrap `inner` under the default [`NAMESPACE`].
    pub fn new(inner: S) -> Self {
        Self::with_prefix(inner, NAMESPACE)
    }

    /// Wrap `inner` under a custom prefix.
    pub fn with_prefix(inner: S, prefix: impl Into<String>) -> Self {
        Self {
            inner,
            prefix: prefix.into(),
        }
    }

    /// The key prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Borrow the wrapped backend.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwrap the backend.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Remove every key under the prefix. Returns how many were removed.
    pub fn clear(&mut self) -> StorageResult<usize> {
        let keys = self.keys();
        for key in &keys {
            self.remove(key)?;
        }
        tracing::debug!(
            target: "mcol.store",
            prefix = %self.prefix,
            removed = keys.len(),
            "cleared namespace"
        );
        Ok(keys.len())
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }
}

impl<S: StyleStore> StyleStore for Namespaced<S> {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(&self.full_key(key))
    }

    fn set(&mut self, key: &str, value: String) -> StorageResult<()> {
        let full = self.full_key(key);
        self.inner.set(&full, value)
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        let full = self.full_key(key);
        self.inner.remove(&full)
    }

    fn keys(&self) -> Vec<String> {
        self.inner
            .keys()
            .into_iter()
            .filter_map(|key| key.strip_prefix(self.prefix.as_str()).map(str::to_string))
            .collect()
    }
}
