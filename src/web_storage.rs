use web_sys::Storage;

use crate::settings::{KeyValueStore, SettingsError};

/// `window.localStorage` as a settings store.
pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    /// Returns `None` when there is no window or storage is disabled.
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.storage
            .set_item(key, value)
            .map_err(|err| SettingsError::Storage(format!("{err:?}")))
    }
}
