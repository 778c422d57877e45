//! In-memory storage
//!
//! Clones share the same map, so a test can keep a handle while a store owns
//! another.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{PersistenceError, Storage};

#[derive(Debug, Default)]
struct Inner {
    blobs: HashMap<String, String>,
    fail_writes: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write and remove fail with a backend error
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    pub fn len(&self) -> usize {
        self.lock().blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.lock().blobs.get(key).cloned())
    }

    fn write(&self, key: &str, blob: &str) -> Result<(), PersistenceError> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(PersistenceError::Backend(format!(
                "write to {:?} rejected",
                key
            )));
        }
        inner.blobs.insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(PersistenceError::Backend(format!(
                "remove of {:?} rejected",
                key
            )));
        }
        inner.blobs.remove(key);
        Ok(())
    }
}
