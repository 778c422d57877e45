//! Browser LocalStorage backend (WASM only)

use wasm_bindgen::JsValue;

use super::{PersistenceError, Storage};

pub struct LocalStorage {
    storage: web_sys::Storage,
}

fn js_error(context: &str, err: JsValue) -> PersistenceError {
    PersistenceError::Backend(format!("{}: {:?}", context, err))
}

impl LocalStorage {
    /// Handle to `window.localStorage`
    pub fn new() -> Result<Self, PersistenceError> {
        let window = web_sys::window()
            .ok_or_else(|| PersistenceError::Backend("no window".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|err| js_error("localStorage unavailable", err))?
            .ok_or_else(|| PersistenceError::Backend("localStorage disabled".to_string()))?;
        Ok(Self { storage })
    }
}

impl Storage for LocalStorage {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.storage
            .get_item(key)
            .map_err(|err| js_error("getItem failed", err))
    }

    fn write(&self, key: &str, blob: &str) -> Result<(), PersistenceError> {
        self.storage
            .set_item(key, blob)
            .map_err(|err| js_error("setItem failed", err))
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.storage
            .remove_item(key)
            .map_err(|err| js_error("removeItem failed", err))
    }
}
