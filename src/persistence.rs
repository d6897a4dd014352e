//! Manual-offset persistence in a host key-value store.
//!
//! Offsets are stored as decimal integers under [`STORAGE_KEY_OFFSET_X`] and
//! [`STORAGE_KEY_OFFSET_Y`]. Persistence is best-effort: a failed read resets
//! both axes to zero, a failed write is logged and otherwise ignored.

#[cfg(test)]
#[path = "persistence_test.rs"]
mod persistence_test;

use crate::consts::{STORAGE_KEY_OFFSET_X, STORAGE_KEY_OFFSET_Y};
use crate::geometry::ManualOffset;
use crate::settings::StoreError;

/// String key-value store (browser `localStorage` in production).
pub trait KeyValueStore {
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be written.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Load the persisted manual offset.
///
/// A missing or unparsable axis reads as zero. A store error zeroes both.
#[must_use]
pub fn load_offsets(store: &dyn KeyValueStore) -> ManualOffset {
    match (read_axis(store, STORAGE_KEY_OFFSET_X), read_axis(store, STORAGE_KEY_OFFSET_Y)) {
        (Ok(x), Ok(y)) => ManualOffset::new(x, y),
        (Err(e), _) | (_, Err(e)) => {
            log::warn!("could not read magnifier offsets, resetting to zero: {e}");
            ManualOffset::default()
        }
    }
}

fn read_axis(store: &dyn KeyValueStore, key: &str) -> Result<i32, StoreError> {
    let Some(raw) = store.get_item(key)? else {
        return Ok(0);
    };
    match raw.trim().parse::<i32>() {
        Ok(value) => Ok(value),
        Err(_) => {
            log::debug!("malformed stored offset {key}={raw:?}; using 0");
            Ok(0)
        }
    }
}

/// Persist the manual offset, logging (and otherwise ignoring) failures.
pub fn save_offsets(store: &mut dyn KeyValueStore, offset: ManualOffset) {
    for (key, value) in [(STORAGE_KEY_OFFSET_X, offset.x), (STORAGE_KEY_OFFSET_Y, offset.y)] {
        if let Err(e) = store.set_item(key, &value.to_string()) {
            log::warn!("could not persist magnifier offset {key}: {e}");
        }
    }
}
