//! `localStorage`-backed implementation of the progress store seam.

use crate::dom::{js_error_message, local_storage};
use pocketplay_progress::ProgressStore;
use wasm_bindgen::JsValue;

/// Browser-backed durable store. All three progress keys live in the same
/// origin-shared `localStorage` keyspace, so no exclusive access is ever
/// assumed.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebProgressStore;

#[derive(Debug, thiserror::Error)]
pub enum WebStorageError {
    /// Storage disabled, unreachable, or over quota.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl WebStorageError {
    fn from_js(value: &JsValue) -> Self {
        Self::Storage(js_error_message(value))
    }
}

impl ProgressStore for WebProgressStore {
    type Error = WebStorageError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let storage = local_storage().map_err(|err| WebStorageError::from_js(&err))?;
        storage
            .get_item(key)
            .map_err(|err| WebStorageError::from_js(&err))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        let storage = local_storage().map_err(|err| WebStorageError::from_js(&err))?;
        // Quota-exceeded failures surface here and are swallowed upstream.
        storage
            .set_item(key, value)
            .map_err(|err| WebStorageError::from_js(&err))
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        let storage = local_storage().map_err(|err| WebStorageError::from_js(&err))?;
        storage
            .remove_item(key)
            .map_err(|err| WebStorageError::from_js(&err))
    }
}
