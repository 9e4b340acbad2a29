//! `localStorage` backend for the progress store.

use jonah_game::KeyValueStore;

use crate::dom;

/// Web-specific storage over `window.localStorage`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStore;

#[derive(Debug, thiserror::Error)]
pub enum BrowserStoreError {
    #[error("localStorage unavailable: {0}")]
    Unavailable(String),
    #[error("localStorage rejected the operation: {0}")]
    Rejected(String),
}

impl BrowserStore {
    fn storage() -> Result<web_sys::Storage, BrowserStoreError> {
        dom::local_storage().map_err(|err| BrowserStoreError::Unavailable(dom::js_error_message(&err)))
    }
}

impl KeyValueStore for BrowserStore {
    type Error = BrowserStoreError;

    fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Self::storage()?
            .get_item(key)
            .map_err(|err| BrowserStoreError::Rejected(dom::js_error_message(&err)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|err| BrowserStoreError::Rejected(dom::js_error_message(&err)))
    }

    fn remove_item(&self, key: &str) -> Result<(), Self::Error> {
        Self::storage()?
            .remove_item(key)
            .map_err(|err| BrowserStoreError::Rejected(dom::js_error_message(&err)))
    }
}
