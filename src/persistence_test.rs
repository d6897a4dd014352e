use std::collections::HashMap;

use super::*;

#[derive(Default)]
struct MemoryStore {
    items: HashMap<String, String>,
    fail_reads: bool,
    fail_writes: bool,
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Unavailable("quota".to_owned()));
        }
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Rejected("quota".to_owned()));
        }
        self.items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

fn store_with(x: &str, y: &str) -> MemoryStore {
    let mut store = MemoryStore::default();
    store.items.insert(STORAGE_KEY_OFFSET_X.to_owned(), x.to_owned());
    store.items.insert(STORAGE_KEY_OFFSET_Y.to_owned(), y.to_owned());
    store
}

#[test]
fn missing_offsets_default_to_zero() {
    assert_eq!(load_offsets(&MemoryStore::default()), ManualOffset::new(0, 0));
}

#[test]
fn stored_offsets_are_loaded() {
    assert_eq!(load_offsets(&store_with("12", "-7")), ManualOffset::new(12, -7));
}

#[test]
fn malformed_axis_defaults_to_zero_independently() {
    assert_eq!(load_offsets(&store_with("abc", "4")), ManualOffset::new(0, 4));
    assert_eq!(load_offsets(&store_with("3", "1.5")), ManualOffset::new(3, 0));
}

#[test]
fn read_failure_resets_both_axes() {
    let mut store = store_with("9", "9");
    store.fail_reads = true;
    assert_eq!(load_offsets(&store), ManualOffset::default());
}

#[test]
fn save_then_load() {
    let mut store = MemoryStore::default();
    save_offsets(&mut store, ManualOffset::new(-25, 40));
    assert_eq!(store.items.get(STORAGE_KEY_OFFSET_X).map(String::as_str), Some("-25"));
    assert_eq!(load_offsets(&store), ManualOffset::new(-25, 40));
}

#[test]
fn write_failure_is_swallowed() {
    let mut store = MemoryStore { fail_writes: true, ..Default::default() };
    save_offsets(&mut store, ManualOffset::new(1, 1));
    assert!(store.items.is_empty());
}
