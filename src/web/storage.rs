//! `localStorage` as a [`KeyValueStore`].

use web_sys::Storage;

use crate::persistence::KeyValueStore;
use crate::settings::StoreError;

pub struct LocalStorage {
    storage: Option<Storage>,
}

impl LocalStorage {
    /// Open the window's `localStorage`. Private browsing modes may refuse it;
    /// every call then reports [`StoreError::Unavailable`].
    pub fn open() -> Self {
        let storage = match web_sys::window().map(|w| w.local_storage()) {
            Some(Ok(storage)) => storage,
            Some(Err(e)) => {
                log::warn!("localStorage refused: {e:?}");
                None
            }
            None => None,
        };
        Self { storage }
    }

    fn storage(&self) -> Result<&Storage, StoreError> {
        self.storage.as_ref().ok_or_else(|| StoreError::Unavailable("localStorage is not accessible".to_owned()))
    }
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage()?.get_item(key).map_err(|e| StoreError::Rejected(format!("{e:?}")))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage()?.set_item(key, value).map_err(|e| StoreError::Rejected(format!("{e:?}")))
    }
}
