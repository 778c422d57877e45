//! Key/value persistence for settings and the leaderboard
//!
//! Features:
//! - Versioned JSON envelope around every blob
//! - File, in-memory and (on the web) LocalStorage backends
//! - Background writer so saves never block the frame loop

pub mod envelope;
#[cfg(not(target_arch = "wasm32"))]
pub mod file;
#[cfg(target_arch = "wasm32")]
pub mod local;
pub mod memory;
#[cfg(not(target_arch = "wasm32"))]
pub mod worker;

use std::rc::Rc;
use std::sync::Arc;

use thiserror::Error;

pub use envelope::{ENVELOPE_VERSION, decode, encode};
#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;
pub use memory::MemoryStorage;
#[cfg(not(target_arch = "wasm32"))]
pub use worker::{PersistenceWorker, SaveFailure};

/// Errors from storage backends and blob decoding
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported data version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("persistence worker is no longer running")]
    WorkerGone,
}

/// Opaque string blobs addressed by key
pub trait Storage {
    /// Stored blob, `None` if the key was never written
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    fn write(&self, key: &str, blob: &str) -> Result<(), PersistenceError>;

    /// Delete a key; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

impl<T: Storage + ?Sized> Storage for Arc<T> {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, blob: &str) -> Result<(), PersistenceError> {
        (**self).write(key, blob)
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        (**self).remove(key)
    }
}

impl<T: Storage + ?Sized> Storage for Rc<T> {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, blob: &str) -> Result<(), PersistenceError> {
        (**self).write(key, blob)
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        (**self).remove(key)
    }
}
